// Catalog Resizer Library
//
// Routes variant keys, transforms catalog images and writes the results back
// to the bucket they are served from.

pub mod bulk;
pub mod config;
pub mod constants;
pub mod error;
pub mod image_optimizer;
pub mod logging;
pub mod materializer;
pub mod pipeline;
pub mod router;
pub mod s3;
pub mod server;
pub mod store;
