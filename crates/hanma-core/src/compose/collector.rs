//! Folding selected blocks into one project contribution

use crate::deps::DependencyMap;
use crate::registry::schema::{ModuleBlock, Named, TemplateBlock, TemplateFile};
use std::collections::BTreeMap;

/// What a block contributes to a project
pub trait Block: Named {
    fn dependencies(&self) -> &[String];
    fn dev_dependencies(&self) -> &[String];
    fn scripts(&self) -> &BTreeMap<String, String>;
    fn env_vars(&self) -> &[String];
    fn files(&self) -> &[TemplateFile];
}

impl Block for TemplateBlock {
    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
    fn dev_dependencies(&self) -> &[String] {
        &self.dev_dependencies
    }
    fn scripts(&self) -> &BTreeMap<String, String> {
        &self.scripts
    }
    fn env_vars(&self) -> &[String] {
        &self.env_vars
    }
    fn files(&self) -> &[TemplateFile] {
        &self.files
    }
}

impl Block for ModuleBlock {
    fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
    fn dev_dependencies(&self) -> &[String] {
        &self.dev_dependencies
    }
    fn scripts(&self) -> &BTreeMap<String, String> {
        &self.scripts
    }
    fn env_vars(&self) -> &[String] {
        &self.env_vars
    }
    fn files(&self) -> &[TemplateFile] {
        &self.files
    }
}

/// Merged result of a set of blocks
///
/// Dependencies and scripts are keyed, so a later block replaces an earlier
/// one's entry. Files and env vars are concatenated in block order; a path
/// listed twice is written twice and the last write is what ends up on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedBlockData {
    pub files: Vec<TemplateFile>,
    pub dependencies: DependencyMap,
    pub dev_dependencies: DependencyMap,
    pub scripts: BTreeMap<String, String>,
    pub env_vars: Vec<String>,
}

impl CollectedBlockData {
    /// Fold one more block into the accumulator
    pub fn add<B: Block + ?Sized>(&mut self, block: &B) {
        self.dependencies.extend_specs(block.dependencies());
        self.dev_dependencies.extend_specs(block.dev_dependencies());
        self.scripts.extend(
            block
                .scripts()
                .iter()
                .map(|(name, command)| (name.clone(), command.clone())),
        );
        self.env_vars.extend(block.env_vars().iter().cloned());
        self.files.extend(block.files().iter().cloned());
    }
}

/// Collect blocks in selection order
pub fn collect_blocks<'a, I, B>(blocks: I) -> CollectedBlockData
where
    I: IntoIterator<Item = &'a B>,
    B: Block + ?Sized + 'a,
{
    let mut data = CollectedBlockData::default();
    for block in blocks {
        tracing::debug!(block = block.name(), "collecting block");
        data.add(block);
    }
    data
}
