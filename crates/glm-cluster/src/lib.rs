//! glm-cluster: bootstrap files for distributed inference.
//!
//! Produces a shared [`ClusterDescriptor`] and a [`NodeStartupScript`] per
//! node. Copying scripts to the nodes and running them is left to the
//! operator.

pub mod bootstrap;

pub use bootstrap::{
    ClusterDescriptor, ClusterLayout, DESCRIPTOR_FILE_NAME, NodeStartupScript, bootstrap,
};
