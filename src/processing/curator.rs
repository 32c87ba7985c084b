use crate::bio::classify::{class_for, replicon_type};
use crate::bio::fasta::{sanitize_id, write_record, FastaReader};
use crate::bio::normalize::{Normalized, Normalizer};
use crate::bio::sequence::Sequence;
use crate::core::config::PipelineConfig;
use crate::processing::dedup::DedupIndex;
use crate::processing::host_map::HostMap;
use crate::processing::manifest::{prune_manifest, ManifestRow, ManifestWriter};
use crate::processing::resolver::{NearDuplicateResolver, ResolutionReport, SplitFiles};
use crate::processing::split::Split;
use crate::processing::stats::{Counter, RunStats};
use crate::tools::mash::MashTool;
use crate::tools::traits::SketchTool;
use crate::utils::progress::create_progress_bar;
use crate::Result;
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What a finished run produced
#[derive(Debug)]
pub struct CurationReport {
    pub stats: RunStats,
    pub manifest_path: PathBuf,
    pub host_map_path: PathBuf,
    /// Paths written per split, in write order
    pub written: SplitFiles,
    /// `None` when the near-duplicate pass was disabled
    pub resolution: Option<ResolutionReport>,
    pub manifest_rows_pruned: usize,
}

/// Drives one curation run: reads every split, filters and writes records,
/// then removes cross-split near-duplicates.
///
/// All run state (dedup index, host map, counters) lives here, so separate
/// instances never share anything. [`Curator::run`] consumes the instance.
pub struct Curator {
    config: PipelineConfig,
    normalizer: Normalizer,
    dedup: DedupIndex,
    host_map: HostMap,
    stats: RunStats,
    sketch_tool: Option<Box<dyn SketchTool>>,
    show_progress: bool,
    written: SplitFiles,
    written_set: HashSet<PathBuf>,
}

/// Visible input files of a directory, sorted by path
fn list_input_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        if !hidden && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Assembly id derived from the input file name
pub fn assembly_id_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sanitize_id(&stem)
}

impl Curator {
    /// Curator backed by `mash`, located once from config or PATH
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let tool = MashTool::from_config(&config.mash);
        Self::with_sketch_tool(config, Box::new(tool))
    }

    pub fn with_sketch_tool(config: PipelineConfig, tool: Box<dyn SketchTool>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            normalizer: Normalizer::new(config.max_ambig, config.min_len),
            config,
            dedup: DedupIndex::new(),
            host_map: HostMap::new(),
            stats: RunStats::new(),
            sketch_tool: Some(tool),
            show_progress: false,
            written: SplitFiles::new(),
            written_set: HashSet::new(),
        })
    }

    /// Skip the near-duplicate pass entirely
    pub fn without_near_duplicate_pass(mut self) -> Self {
        self.sketch_tool = None;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn run(mut self) -> Result<CurationReport> {
        let meta_dir = self.config.metadata_dir();
        fs::create_dir_all(&meta_dir)?;

        let mut manifest = ManifestWriter::create(self.config.manifest_path())?;
        for split in Split::ALL {
            self.process_split(split, &mut manifest)?;
        }
        let manifest_path = manifest.finish()?;

        let host_map_path = self.config.host_map_path();
        self.host_map.save(&host_map_path)?;
        info!(
            "Wrote host map for {} assemblies to {}",
            self.host_map.len(),
            host_map_path.display()
        );

        let resolution = match self.sketch_tool.as_mut() {
            Some(tool) => {
                let mut resolver =
                    NearDuplicateResolver::new(&mut **tool, self.config.mash_threshold, &meta_dir);
                Some(resolver.resolve(&self.written, &mut self.stats))
            }
            None => {
                info!("Near-duplicate removal disabled");
                None
            }
        };

        let mut manifest_rows_pruned = 0;
        if let Some(report) = &resolution {
            if !report.removed.is_empty() {
                if self.config.prune_manifest {
                    manifest_rows_pruned = prune_manifest(&manifest_path, &report.removed_paths())?;
                    info!("Pruned {} manifest rows for removed files", manifest_rows_pruned);
                } else {
                    warn!(
                        "{} manifest rows point at files removed as near-duplicates",
                        report.removed.len()
                    );
                }
            }
        }

        info!("Processing complete.");
        info!("Stats: {}", self.stats.to_json_pretty());

        Ok(CurationReport {
            stats: self.stats,
            manifest_path,
            host_map_path,
            written: self.written,
            resolution,
            manifest_rows_pruned,
        })
    }

    fn process_split(&mut self, split: Split, manifest: &mut ManifestWriter) -> Result<()> {
        let input_dir = self
            .config
            .base_dir
            .join(split.as_str())
            .join(&self.config.category);

        if !input_dir.is_dir() {
            warn!("Skipping missing directory: {}", input_dir.display());
            return Ok(());
        }

        let files = list_input_files(&input_dir)?;
        info!("Processing {} ({} files)...", split, files.len());

        let pb = if self.show_progress {
            create_progress_bar(files.len() as u64, &format!("Curating {}", split))
        } else {
            ProgressBar::hidden()
        };

        for path in &files {
            self.process_file(split, path, manifest)?;
            pb.inc(1);
        }
        pb.finish_and_clear();

        Ok(())
    }

    fn process_file(&mut self, split: Split, path: &Path, manifest: &mut ManifestWriter) -> Result<()> {
        let assembly_id = assembly_id_for(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let reader = match FastaReader::open(path) {
            Ok(reader) => reader,
            Err(e) => {
                error!("Error reading {}: {}", name, e);
                self.stats.increment(Counter::FilesFailed);
                return Ok(());
            }
        };

        debug!("Reading {} as assembly {}", path.display(), assembly_id);
        for record in reader {
            match record {
                Ok(record) => self.process_record(split, path, &assembly_id, record, manifest)?,
                Err(e) => {
                    // Records already written from this file are kept
                    error!("Error reading {}: {}", name, e);
                    self.stats.increment(Counter::FilesFailed);
                    return Ok(());
                }
            }
        }

        self.stats.increment(Counter::FilesProcessed);
        Ok(())
    }

    fn process_record(
        &mut self,
        split: Split,
        source: &Path,
        assembly_id: &str,
        record: Sequence,
        manifest: &mut ManifestWriter,
    ) -> Result<()> {
        self.stats.increment(Counter::RecordsSeen);

        let description = record.description_or_id().to_string();
        let rtype = replicon_type(&description);
        let class = class_for(&self.config.category, rtype);

        // Before quality/dedup so unknown records never take a dedup slot
        if class.is_unknown() && !self.config.keep_unknown {
            debug!("{}: unknown class, dropped", record.id);
            self.stats.increment(Counter::SkippedUnknownClass);
            return Ok(());
        }

        let (cleaned, fingerprint) = match self.normalizer.normalize(&record.sequence) {
            Normalized::LowQuality => {
                debug!("{}: too many ambiguous symbols", record.id);
                self.stats.increment(Counter::SkippedLowQuality);
                return Ok(());
            }
            Normalized::TooShort { cleaned_len } => {
                debug!("{}: {} bp after cleaning", record.id, cleaned_len);
                self.stats.increment(Counter::SkippedShort);
                return Ok(());
            }
            Normalized::Accepted {
                cleaned,
                fingerprint,
            } => (cleaned, fingerprint),
        };

        if !self.dedup.register(fingerprint) {
            debug!("{}: exact duplicate of an earlier record", record.id);
            self.stats.increment(Counter::SkippedDuplicateMd5);
            return Ok(());
        }

        self.host_map
            .record(assembly_id, &record.id, &description, rtype);

        let out_dir = self
            .config
            .out_dir
            .join(split.as_str())
            .join(class.as_str());
        fs::create_dir_all(&out_dir)?;

        let out_path = out_dir.join(format!("{}__{}.fna", assembly_id, sanitize_id(&record.id)));
        let record = Sequence {
            sequence: cleaned,
            ..record
        };
        write_record(&out_path, &record)?;
        self.stats.increment(Counter::RecordsWritten);

        manifest.append(&ManifestRow {
            split,
            category: self.config.category.clone(),
            class4: class,
            replicon_type: rtype,
            host_assembly: assembly_id.to_string(),
            accession: record.id.clone(),
            description,
            path: out_path.clone(),
            source_file: source.to_path_buf(),
        })?;

        if self.written_set.insert(out_path.clone()) {
            self.written.entry(split).or_default().push(out_path);
        } else {
            warn!("{} overwritten by a later record with the same name", out_path.display());
        }

        Ok(())
    }
}
