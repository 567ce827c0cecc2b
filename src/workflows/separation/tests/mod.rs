mod clearance;
mod common;
mod revocation;
