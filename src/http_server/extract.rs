//! axum extractors whose rejections render through [`ApiError`], so malformed
//! bodies, query strings and path ids get the same JSON error body as every
//! other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::http_server::error::ApiError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(ApiError))]
pub struct Form<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);
