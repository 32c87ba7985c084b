use crate::bio::classify::RepliconType;
use crate::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const PLASMID_WORD: &str = "plasmid";

/// Replicons observed for one assembly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    /// Insertion-ordered, duplicate-free
    pub chromosome_accessions: Vec<String>,
    /// Record id to plasmid name
    pub plasmids: IndexMap<String, String>,
}

/// Plasmid name from a description: the text after the first "plasmid"
/// (case-insensitive), trimmed, with the original casing. Falls back to the
/// record id when nothing follows.
pub fn extract_plasmid_name(description: &str, record_id: &str) -> String {
    let lowered = description.to_ascii_lowercase();
    if let Some(pos) = lowered.find(PLASMID_WORD) {
        let trailing = description[pos + PLASMID_WORD.len()..].trim();
        if !trailing.is_empty() {
            return trailing.to_string();
        }
    }
    record_id.to_string()
}

/// Per-assembly map of chromosome accessions and plasmid labels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostMap {
    assemblies: IndexMap<String, HostEntry>,
}

impl HostMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the map for an accepted record. Viral and unknown replicons
    /// leave the map untouched.
    pub fn record(
        &mut self,
        assembly_id: &str,
        record_id: &str,
        description: &str,
        rtype: RepliconType,
    ) {
        match rtype {
            RepliconType::Chromosomal => {
                let entry = self.entry(assembly_id);
                if !entry.chromosome_accessions.iter().any(|a| a == record_id) {
                    entry.chromosome_accessions.push(record_id.to_string());
                }
            }
            RepliconType::Plasmid => {
                let name = extract_plasmid_name(description, record_id);
                self.entry(assembly_id)
                    .plasmids
                    .insert(record_id.to_string(), name);
            }
            RepliconType::Viral | RepliconType::Unknown => {}
        }
    }

    fn entry(&mut self, assembly_id: &str) -> &mut HostEntry {
        self.assemblies.entry(assembly_id.to_string()).or_default()
    }

    pub fn get(&self, assembly_id: &str) -> Option<&HostEntry> {
        self.assemblies.get(assembly_id)
    }

    pub fn len(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    /// Write the map as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
