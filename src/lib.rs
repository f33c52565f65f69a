//! A four-function integer calculator built around a batch processor:
//! records of `<operation> <int> <int>` come in on one stream, one decimal
//! result per successful record goes out on another, and progress is
//! narrated to an injected observer rather than hardwired global output.

pub mod batch;
pub mod ops;
