use crate::errors::ApiError;
use sea_orm::{ColumnTrait, sea_query::Order};

/// Resolve a `sortby` value to a column and direction.
///
/// `"name"` sorts ascending, `"-name"` descending. With no `sortby` the
/// default column is used in ascending order.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` when the column is not in `order_column_logic`.
pub fn parse_sortby<C>(
    sortby: Option<&str>,
    order_column_logic: &[(String, C)],
    default_column: C,
) -> Result<(C, Order), ApiError>
where
    C: ColumnTrait + Copy,
{
    let Some(sortby) = sortby.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok((default_column, Order::Asc));
    };

    let (sort_column, order_direction) = match sortby.strip_prefix('-') {
        Some(column) => (column, Order::Desc),
        None => (sortby.strip_prefix('+').unwrap_or(sortby), Order::Asc),
    };

    order_column_logic
        .iter()
        .find(|(col_name, _)| col_name.as_str() == sort_column)
        .map(|&(_, col)| (col, order_direction))
        .ok_or_else(|| {
            ApiError::bad_request(format!("cannot sort by unknown column '{sort_column}'"))
        })
}
