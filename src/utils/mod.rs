pub mod backup;
pub mod fingerprint;
