pub mod export;
pub mod migrate;
pub mod qr;
pub mod stats;
pub mod user;
