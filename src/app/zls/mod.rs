//! Builds ZLS from source against an installed compiler (spec §4.7).

mod cert;
mod commit;
mod provisioner;

pub use provisioner::ZlsProvisioner;
