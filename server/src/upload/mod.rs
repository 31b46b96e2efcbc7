//! Upload pipeline for `POST /api/irys/upload`.
//!
//! A request flows through four stages:
//! 1. `request` checks the body shape and rebuilds the byte buffer
//! 2. `service` applies the size gate
//! 3. `session` hands out the process-wide uploader, constructing it once
//! 4. the `uploader::Uploader` submits the bytes and returns a receipt
//!
//! Nothing is retried and nothing is deduplicated: uploading the same bytes
//! twice yields two transactions.

pub mod request;
pub mod service;
pub mod session;
pub mod uploader;

pub use request::UploadRequest;
pub use service::{UploadResponse, UploadService};
pub use session::UploaderSession;
pub use uploader::{Tag, UploadReceipt, Uploader, UploaderFactory};
