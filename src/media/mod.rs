//! Media Upload Module
//!
//! Passthrough to an external media provider for file attachments (receipts,
//! vehicle documents). The server never stores file bytes itself.
//!
//! ## Naming
//! Every asset lives under `{root}/{userId}/` (or `{root}/anonymous/`) and is named
//! `{timestamp_ms}_{sanitized filename}`. Deletion by `publicId` is only allowed
//! inside the caller's namespace when the caller identifies itself.
//!
//! ## Submodules
//! - **`blob`**: The `BlobStore` trait handlers depend on.
//! - **`cloudinary`**: Signed REST client for the Cloudinary upload API.
//! - **`naming`**: Namespace and identifier construction.
//! - **`handlers`**: Axum handlers for `POST` and `DELETE /api/upload`.
//! - **`types`**: Wire DTOs and `MediaError`.

pub mod blob;
pub mod cloudinary;
pub mod handlers;
pub mod naming;
pub mod types;
