//! Axum extractors for acton-crud
//!
//! [`PostedForm`] reads a submission into [`PostedData`], keeping every pair
//! in order. Typed extractors like `Form<T>` cannot be used for model forms:
//! inline row keys (`child_0_text`) are only known once the row count is read.
//!
//! # Example
//!
//! ```rust,no_run
//! use acton_crud::extractors::PostedForm;
//! use acton_crud::forms::{FormInit, FormSpec, ModelForm};
//! use axum::{extract::State, http::StatusCode};
//! use std::sync::Arc;
//!
//! async fn create(
//!     State(spec): State<Arc<FormSpec>>,
//!     PostedForm(posted): PostedForm,
//! ) -> StatusCode {
//!     let Ok(mut form) = ModelForm::new(&spec, FormInit::new().posted(&posted)) else {
//!         return StatusCode::INTERNAL_SERVER_ERROR;
//!     };
//!     if form.validate() {
//!         StatusCode::CREATED
//!     } else {
//!         StatusCode::UNPROCESSABLE_ENTITY
//!     }
//! }
//! ```

use axum::extract::{rejection::FormRejection, Form, FromRequest, Request};

use crate::forms::PostedData;

/// Submitted form pairs, in submission order
///
/// For `GET` and `HEAD` requests the query string is read; otherwise the body
/// must be `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Default)]
pub struct PostedForm(pub PostedData);

impl<S> FromRequest<S> for PostedForm
where
    S: Send + Sync,
{
    type Rejection = FormRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state).await?;
        tracing::trace!(pairs = pairs.len(), "form submission extracted");
        Ok(Self(PostedData::from_pairs(pairs)))
    }
}
