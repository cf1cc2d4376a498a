use crate::errors::ApiError;
use crate::models::{Pagination, PaginationParams};
use crate::routes::CrudState;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

/// Turn raw query parameters into a [`Pagination`].
///
/// `skip` defaults to zero and `limit` to `max_limit`. The values are not
/// clamped: anything out of range is rejected.
///
/// # Errors
///
/// `ApiError::InvalidParameters` when `skip` is negative, `limit` is not
/// positive, or `limit` exceeds `max_limit`.
pub fn validate_pagination(
    params: PaginationParams,
    max_limit: Option<u64>,
) -> Result<Pagination, ApiError> {
    let skip = u64::try_from(params.skip.unwrap_or(0)).map_err(|_| {
        ApiError::validation_failed(vec![
            "skip query parameter must be greater or equal to zero".to_string(),
        ])
    })?;

    let limit = match params.limit {
        Some(limit) => Some(
            u64::try_from(limit)
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or_else(|| {
                    ApiError::validation_failed(vec![
                        "limit query parameter must be greater then zero".to_string(),
                    ])
                })?,
        ),
        None => max_limit,
    };

    if let (Some(limit), Some(max_limit)) = (limit, max_limit) {
        if limit > max_limit {
            return Err(ApiError::validation_failed(vec![format!(
                "limit query parameter must be less then {max_limit}"
            )]));
        }
    }

    Ok(Pagination {
        skip,
        limit,
        sortby: params.sortby,
    })
}

impl FromRequestParts<CrudState> for Pagination {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CrudState,
    ) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PaginationParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::validation_failed(vec![rejection.body_text()]))?;
        validate_pagination(params, state.paginate)
    }
}
