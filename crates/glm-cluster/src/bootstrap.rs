//! Cluster bootstrap: descriptor plus one startup script per node.
//!
//! Output layout inside [`ClusterLayout::dir`]:
//!
//! ```text
//! cluster_config.json   shared descriptor
//! start_node_0.sh       export NODE_ID=0 ... <worker_entry> worker <model> --nodes N --node-id 0
//! start_node_1.sh
//! ...
//! ```
//!
//! Re-running with the same inputs rewrites the same bytes. Scripts for node
//! ids beyond the new address list are removed.

use std::path::{Path, PathBuf};

use glm_core::{Architecture, LauncherError, LauncherResult, ModelRegistry};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DESCRIPTOR_FILE_NAME: &str = "cluster_config.json";

/// Persisted description of one cluster session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterDescriptor {
    pub model: String,
    /// Node addresses; position is the node id.
    pub nodes: Vec<String>,
    pub architecture: Architecture,
}

impl ClusterDescriptor {
    pub fn from_file(path: &Path) -> LauncherResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A generated per-node startup script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeStartupScript {
    pub node_id: usize,
    pub address: String,
    pub path: PathBuf,
    pub content: String,
}

/// Where bootstrap output goes and how scripts start a worker.
#[derive(Debug, Clone)]
pub struct ClusterLayout {
    pub dir: PathBuf,
    /// Worker executable, e.g. `glm` or `/usr/local/bin/glm`. Written to the
    /// script as one quoted word.
    pub worker_entry: String,
}

impl ClusterLayout {
    pub fn new(dir: impl Into<PathBuf>, worker_entry: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            worker_entry: worker_entry.into(),
        }
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.dir.join(DESCRIPTOR_FILE_NAME)
    }

    pub fn script_path(&self, node_id: usize) -> PathBuf {
        self.dir.join(format!("start_node_{node_id}.sh"))
    }
}

/// Write the cluster descriptor and one executable startup script per
/// address.
///
/// Inputs are validated before anything is written: an empty address list
/// is a [`LauncherError::Configuration`], an unregistered model a
/// [`LauncherError::UnknownModel`].
pub fn bootstrap(
    registry: &ModelRegistry,
    model_name: &str,
    addresses: &[String],
    layout: &ClusterLayout,
) -> LauncherResult<(ClusterDescriptor, Vec<NodeStartupScript>)> {
    if addresses.is_empty() {
        return Err(LauncherError::Configuration(
            "at least one node address is required for cluster setup".to_string(),
        ));
    }
    for (pos, address) in addresses.iter().enumerate() {
        if address.is_empty() {
            return Err(LauncherError::Configuration(format!(
                "node address at position {pos} is empty"
            )));
        }
        if address.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(LauncherError::Configuration(format!(
                "node address at position {pos} contains whitespace or control characters: {address:?}"
            )));
        }
    }

    let model = registry.lookup(model_name)?;

    info!("setting up distributed cluster for {} on {} nodes", model.name, addresses.len());

    let descriptor = ClusterDescriptor {
        model: model.name.clone(),
        nodes: addresses.to_vec(),
        architecture: model.architecture,
    };

    std::fs::create_dir_all(&layout.dir)?;

    let descriptor_path = layout.descriptor_path();
    let mut json = serde_json::to_string_pretty(&descriptor)?;
    json.push('\n');
    std::fs::write(&descriptor_path, json)?;
    info!("cluster configuration saved to {}", descriptor_path.display());

    let mut scripts = Vec::with_capacity(addresses.len());
    for (node_id, address) in addresses.iter().enumerate() {
        let path = layout.script_path(node_id);
        let content = render_script(node_id, address, &descriptor, &descriptor_path, layout);

        std::fs::write(&path, &content)?;
        make_executable(&path)?;
        info!("generated startup script {}", path.display());

        scripts.push(NodeStartupScript {
            node_id,
            address: address.clone(),
            path,
            content,
        });
    }

    // Scripts left over from a larger cluster would start workers with a
    // stale node count.
    for node_id in addresses.len().. {
        let path = layout.script_path(node_id);
        if !path.is_file() {
            break;
        }
        std::fs::remove_file(&path)?;
        info!("removed stale startup script {}", path.display());
    }

    Ok((descriptor, scripts))
}

fn render_script(
    node_id: usize,
    address: &str,
    descriptor: &ClusterDescriptor,
    descriptor_path: &Path,
    layout: &ClusterLayout,
) -> String {
    format!(
        "#!/bin/bash\n\
         # Startup script for node {node_id} ({address})\n\
         \n\
         export NODE_ID={node_id}\n\
         export CLUSTER_CONFIG={config}\n\
         \n\
         {entry} worker {model} --nodes {nodes} --node-id {node_id}\n",
        config = shell_quote(&descriptor_path.display().to_string()),
        entry = shell_quote(&layout.worker_entry),
        model = shell_quote(&descriptor.model),
        nodes = descriptor.nodes.len(),
    )
}

/// Quote `value` as a single shell word. Words made only of characters
/// that are never special to the shell are left bare.
fn shell_quote(value: &str) -> String {
    let is_plain = |c: char| c.is_ascii_alphanumeric() || "_-./:=@%+,".contains(c);
    if !value.is_empty() && value.chars().all(is_plain) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_script_content() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ClusterLayout::new(dir.path(), "glm");
        let registry = ModelRegistry::builtin();

        let (_, scripts) = bootstrap(
            &registry,
            "glm_4_9b_instruct_q40",
            &addrs(&["10.0.0.1", "10.0.0.2"]),
            &layout,
        )
        .unwrap();

        let expected = format!(
            "#!/bin/bash\n\
             # Startup script for node 1 (10.0.0.2)\n\
             \n\
             export NODE_ID=1\n\
             export CLUSTER_CONFIG={}\n\
             \n\
             glm worker glm_4_9b_instruct_q40 --nodes 2 --node-id 1\n",
            shell_quote(&layout.descriptor_path().display().to_string())
        );
        assert_eq!(scripts[1].content, expected);
        assert_eq!(std::fs::read_to_string(&scripts[1].path).unwrap(), expected);
    }

    #[test]
    fn test_descriptor_json_fields() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ClusterLayout::new(dir.path(), "glm");

        bootstrap(
            &ModelRegistry::builtin(),
            "intellect3_106b_moe_q40",
            &addrs(&["a", "b"]),
            &layout,
        )
        .unwrap();

        let raw = std::fs::read_to_string(layout.descriptor_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["model"], "intellect3_106b_moe_q40");
        assert_eq!(value["nodes"], serde_json::json!(["a", "b"]));
        assert_eq!(value["architecture"], "intellect_3");
    }

    #[cfg(unix)]
    #[test]
    fn test_scripts_are_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let layout = ClusterLayout::new(dir.path(), "glm");
        let (_, scripts) = bootstrap(
            &ModelRegistry::builtin(),
            "glm_4_4b_instruct_q40",
            &addrs(&["node-a"]),
            &layout,
        )
        .unwrap();

        let mode = std::fs::metadata(&scripts[0].path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_blank_address_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ClusterLayout::new(dir.path().join("cluster"), "glm");

        let err = bootstrap(
            &ModelRegistry::builtin(),
            "glm_4_4b_instruct_q40",
            &addrs(&["10.0.0.1", " "]),
            &layout,
        )
        .unwrap_err();
        assert!(matches!(err, LauncherError::Configuration(_)));
        assert!(!layout.dir.exists());
    }

    #[test]
    fn test_address_with_newline_rejected_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ClusterLayout::new(dir.path().join("cluster"), "glm");

        let err = bootstrap(
            &ModelRegistry::builtin(),
            "glm_4_4b_instruct_q40",
            &addrs(&["10.0.0.1)\ntouch /tmp/injected #"]),
            &layout,
        )
        .unwrap_err();
        assert!(matches!(err, LauncherError::Configuration(_)), "got {err}");
        assert!(!layout.dir.exists());

        for bad in ["10.0.0.1 10.0.0.2", "10.0.0.1\t", "node\u{7}a"] {
            let registry = ModelRegistry::builtin();
            let err = bootstrap(&registry, "glm_4_4b_instruct_q40", &addrs(&[bad]), &layout)
                .unwrap_err();
            assert!(matches!(err, LauncherError::Configuration(_)), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/usr/local/bin/glm"), "/usr/local/bin/glm");
        assert_eq!(shell_quote("/home/Jane Doe/c.json"), "'/home/Jane Doe/c.json'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("$(id)"), "'$(id)'");
        assert_eq!(shell_quote(""), "''");
    }

    #[cfg(unix)]
    #[test]
    fn test_spaced_paths_survive_the_shell() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ClusterLayout::new(dir.path().join("Jane Doe").join("cluster"), "true");

        let (_, scripts) = bootstrap(
            &ModelRegistry::builtin(),
            "glm_4_4b_instruct_q40",
            &addrs(&["10.0.0.1"]),
            &layout,
        )
        .unwrap();

        let commands: Vec<_> = scripts[0]
            .content
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        assert_eq!(commands.len(), 3, "{commands:?}");

        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(r#". "$1" && printf %s "$CLUSTER_CONFIG""#)
            .arg("sh")
            .arg(&scripts[0].path)
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(
            String::from_utf8(output.stdout).unwrap(),
            layout.descriptor_path().display().to_string()
        );
    }
}
