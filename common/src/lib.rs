#![allow(clippy::module_inception)]
#![allow(clippy::type_complexity)]

pub mod block;
pub mod call;
pub mod crypto;
pub mod error;
pub mod event;
pub mod origin;
pub mod referenda;
pub mod scheduler;
pub mod serializer;
pub mod storage;
