use super::traits::{SketchDistance, SketchTool};
use crate::core::config::MashConfig;
use anyhow::{Context, Result};
use nom::{
    bytes::complete::take_till1,
    character::complete::char,
    combinator::rest,
    number::complete::double,
    sequence::terminated,
    IResult,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

const BINARY_NAME: &str = "mash";
const SKETCH_SUFFIX: &str = ".msh";

/// Above this many inputs the file names go through a `-l` list file
const LIST_FILE_THRESHOLD: usize = 256;

/// `mash` invoked as a subprocess
pub struct MashTool {
    binary: Option<PathBuf>,
    kmer_size: u32,
    sketch_size: u32,
    threads: usize,
}

impl MashTool {
    /// Locate the binary once, preferring an explicit path from config
    pub fn from_config(config: &MashConfig) -> Self {
        let configured = config.binary.clone().filter(|p| {
            let found = p.is_file();
            if !found {
                warn!("Configured mash binary {} not found, falling back to PATH", p.display());
            }
            found
        });
        let binary = configured.or_else(|| which::which(BINARY_NAME).ok());

        if let Some(path) = &binary {
            debug!("Using mash at {}", path.display());
        }

        Self {
            binary,
            kmer_size: config.kmer_size,
            sketch_size: config.sketch_size,
            threads: if config.threads == 0 {
                num_cpus::get()
            } else {
                config.threads
            },
        }
    }

    /// Use `binary` as given, with default sketch parameters
    pub fn with_binary<P: AsRef<Path>>(binary: P) -> Self {
        let defaults = MashConfig::default();
        Self {
            binary: Some(binary.as_ref().to_path_buf()),
            kmer_size: defaults.kmer_size,
            sketch_size: defaults.sketch_size,
            threads: num_cpus::get(),
        }
    }

    pub fn binary_path(&self) -> Option<&Path> {
        self.binary.as_deref()
    }

    fn require_binary(&self) -> Result<&Path> {
        self.binary
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("mash is not installed or not on PATH"))
    }
}

/// Path mash writes for a given `-o` prefix
pub fn sketch_path(output_prefix: &Path) -> PathBuf {
    if output_prefix.to_string_lossy().ends_with(SKETCH_SUFFIX) {
        return output_prefix.to_path_buf();
    }
    let mut path = output_prefix.as_os_str().to_owned();
    path.push(SKETCH_SUFFIX);
    PathBuf::from(path)
}

fn tab_field(input: &str) -> IResult<&str, &str> {
    terminated(take_till1(|c: char| c == '\t'), char('\t'))(input)
}

/// Parse one line of `mash dist` output:
/// reference, query, distance, p-value, shared hashes
fn parse_dist_line(line: &str) -> IResult<&str, SketchDistance> {
    let (input, reference) = tab_field(line)?;
    let (input, query) = tab_field(input)?;
    let (input, distance) = terminated(double, char('\t'))(input)?;
    let (input, p_value) = terminated(double, char('\t'))(input)?;
    let (input, shared) = rest(input)?;

    Ok((
        input,
        SketchDistance {
            reference: reference.to_string(),
            query: query.to_string(),
            distance,
            p_value,
            shared_hashes: shared.trim().to_string(),
        },
    ))
}

pub fn parse_dist_output(output: &str) -> Result<Vec<SketchDistance>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            parse_dist_line(line)
                .map(|(_, d)| d)
                .map_err(|e| anyhow::anyhow!("Unexpected mash dist line {:?}: {:?}", line, e))
        })
        .collect()
}

impl SketchTool for MashTool {
    fn name(&self) -> &str {
        BINARY_NAME
    }

    fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    fn build_sketch(&mut self, inputs: &[PathBuf], output_prefix: &Path) -> Result<PathBuf> {
        let binary = self.require_binary()?;
        if inputs.is_empty() {
            anyhow::bail!("Cannot build a sketch from zero inputs");
        }

        let mut cmd = Command::new(binary);
        cmd.arg("sketch")
            .arg("-k")
            .arg(self.kmer_size.to_string())
            .arg("-s")
            .arg(self.sketch_size.to_string())
            .arg("-p")
            .arg(self.threads.to_string())
            .arg("-o")
            .arg(output_prefix);

        let list_file = if inputs.len() > LIST_FILE_THRESHOLD {
            let mut list = output_prefix.as_os_str().to_owned();
            list.push(".list");
            let list = PathBuf::from(list);
            let mut file = fs::File::create(&list)
                .with_context(|| format!("Failed to create {}", list.display()))?;
            for input in inputs {
                writeln!(file, "{}", input.display())?;
            }
            cmd.arg("-l").arg(&list);
            Some(list)
        } else {
            cmd.args(inputs);
            None
        };

        debug!("Running {:?}", cmd);
        let output = cmd
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .context("Failed to run mash sketch")?;

        if let Some(list) = list_file {
            fs::remove_file(list).ok();
        }

        if !output.status.success() {
            anyhow::bail!(
                "mash sketch exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(sketch_path(output_prefix))
    }

    fn distance(&mut self, reference: &Path, query: &Path) -> Result<Vec<SketchDistance>> {
        let binary = self.require_binary()?;

        let output = Command::new(binary)
            .arg("dist")
            .arg("-p")
            .arg(self.threads.to_string())
            .arg(reference)
            .arg(query)
            .stdin(Stdio::null())
            .output()
            .context("Failed to run mash dist")?;

        if !output.status.success() {
            anyhow::bail!(
                "mash dist exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_dist_output(&String::from_utf8_lossy(&output.stdout))
    }

    fn version(&self) -> Result<String> {
        let binary = self.require_binary()?;
        let output = Command::new(binary)
            .arg("--version")
            .output()
            .context("Failed to run mash")?;

        if !output.status.success() {
            anyhow::bail!("mash returned error");
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
