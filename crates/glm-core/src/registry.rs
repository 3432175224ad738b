//! Model registry: the fixed table of launchable models.
//!
//! Built once at startup and passed by reference to whatever needs a
//! descriptor. There is no global instance.

use std::collections::BTreeMap;

use crate::error::{LauncherError, LauncherResult};
use crate::types::{Architecture, ModelDescriptor, MoeSpec};

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: BTreeMap<String, ModelDescriptor>,
}

impl ModelRegistry {
    /// Registry containing the models shipped with the launcher.
    pub fn builtin() -> Self {
        Self::from_models(builtin_models())
    }

    pub fn from_models(models: impl IntoIterator<Item = ModelDescriptor>) -> Self {
        let models = models
            .into_iter()
            .map(|m| (m.name.clone(), m))
            .collect();
        Self { models }
    }

    /// Return a registry with `extra` added on top. An entry whose name is
    /// already present replaces the existing one.
    pub fn with_models(mut self, extra: impl IntoIterator<Item = ModelDescriptor>) -> Self {
        for model in extra {
            self.models.insert(model.name.clone(), model);
        }
        self
    }

    pub fn lookup(&self, name: &str) -> LauncherResult<&ModelDescriptor> {
        self.models
            .get(name)
            .ok_or_else(|| LauncherError::UnknownModel(name.to_string()))
    }

    /// All entries, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn builtin_models() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor {
            name: "glm_4_9b_instruct_q40".to_string(),
            size: "9B".to_string(),
            required_memory_gb: 7,
            quantization: "q40".to_string(),
            architecture: Architecture::Glm4,
            moe: None,
            source_url: "https://huggingface.co/THUDM/glm-4-9b-chat/resolve/main/glm-4-9b-chat-q4_0.gguf"
                .to_string(),
        },
        ModelDescriptor {
            name: "glm_4_4b_instruct_q40".to_string(),
            size: "4B".to_string(),
            required_memory_gb: 3,
            quantization: "q40".to_string(),
            architecture: Architecture::Glm4,
            moe: None,
            source_url: "https://huggingface.co/THUDM/glm-4-4b/resolve/main/glm-4-4b-q4_0.gguf"
                .to_string(),
        },
        // 13GB assumes aggressive quantization of the 106B weights.
        ModelDescriptor {
            name: "intellect3_106b_moe_q40".to_string(),
            size: "106B".to_string(),
            required_memory_gb: 13,
            quantization: "q40".to_string(),
            architecture: Architecture::Intellect3,
            moe: Some(MoeSpec {
                expert_count: 16,
                active_expert_count: 2,
            }),
            source_url: "https://huggingface.co/intellect-ai/intellect-3-106b/resolve/main/intellect3-106b-moeq40.gguf"
                .to_string(),
        },
    ]
}
