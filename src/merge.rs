//! Merge orchestration
//!
//! Walks the set of complete pairs and produces one output document per
//! identifier, appending the secondary (cover/signature) part before the
//! primary part. The append capability itself sits behind the
//! `DocumentAppender` trait so the orchestration logic can be tested
//! against a recording fake without touching real PDF files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId};

use crate::error::{CasemergeError, CasemergeResult};
use crate::models::{MergeOutcome, MergeStatus, Pair};

/// Fixed prefix distinguishing merge outputs from other pipelines
pub const OUTPUT_PREFIX: &str = "MT";

/// Abstract "append two documents into one" capability.
///
/// One appender instance accumulates a single output document: call
/// `append` once per input in the order the pages must appear, then
/// `write` to produce the file. Implementations own their resources and
/// release them on drop, success or failure.
pub trait DocumentAppender {
    /// Open `source` and append its pages after any content accumulated
    /// so far.
    fn append(&mut self, source: &Path) -> CasemergeResult<()>;

    /// Write the accumulated document to `dest`, overwriting any existing
    /// file at that path.
    fn write(&mut self, dest: &Path) -> CasemergeResult<()>;
}

/// Factory for appenders, one per merged output.
pub trait MergeBackend {
    fn appender(&self) -> Box<dyn DocumentAppender>;
}

/// Production backend built on lopdf.
pub struct PdfBackend;

impl MergeBackend for PdfBackend {
    fn appender(&self) -> Box<dyn DocumentAppender> {
        Box::new(PdfAppender::default())
    }
}

/// Accumulates loaded PDF documents and assembles them on `write`.
#[derive(Default)]
pub struct PdfAppender {
    parts: Vec<Document>,
}

impl DocumentAppender for PdfAppender {
    fn append(&mut self, source: &Path) -> CasemergeResult<()> {
        let doc = Document::load(source).map_err(|err| CasemergeError::DocumentOpen {
            path: source.to_path_buf(),
            message: err.to_string(),
        })?;
        self.parts.push(doc);
        Ok(())
    }

    fn write(&mut self, dest: &Path) -> CasemergeResult<()> {
        let write_err = |message: String| CasemergeError::DocumentWrite {
            path: dest.to_path_buf(),
            message,
        };

        let mut merged = Document::with_version("1.5");
        let mut max_id = 1;
        let mut page_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
        let mut all_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

        // Renumber each part into a disjoint id range. Page ids then sort
        // in append order, which fixes the page order of the output.
        for mut doc in self.parts.drain(..) {
            doc.renumber_objects_with(max_id);
            max_id = doc.max_id + 1;
            for (_, object_id) in doc.get_pages() {
                let page = doc
                    .get_object(object_id)
                    .map_err(|err| write_err(err.to_string()))?
                    .to_owned();
                page_objects.insert(object_id, page);
            }
            all_objects.extend(doc.objects);
        }

        // Keep the first catalog, fold all page trees into one, and skip
        // pages (re-parented below) and outlines (not carried over).
        let mut catalog: Option<(ObjectId, Object)> = None;
        let mut page_tree: Option<(ObjectId, Object)> = None;

        for (object_id, object) in all_objects.iter() {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" => {
                    catalog = Some((
                        if let Some((id, _)) = catalog { id } else { *object_id },
                        object.clone(),
                    ));
                }
                b"Pages" => {
                    if let Ok(dictionary) = object.as_dict() {
                        let mut dictionary = dictionary.clone();
                        if let Some((_, ref existing)) = page_tree {
                            if let Ok(existing) = existing.as_dict() {
                                dictionary.extend(existing);
                            }
                        }
                        page_tree = Some((
                            if let Some((id, _)) = page_tree { id } else { *object_id },
                            Object::Dictionary(dictionary),
                        ));
                    }
                }
                b"Page" => {}
                b"Outlines" => {}
                b"Outline" => {}
                _ => {
                    merged.objects.insert(*object_id, object.clone());
                }
            }
        }

        let (pages_id, pages_obj) =
            page_tree.ok_or_else(|| write_err("no page tree in input documents".to_string()))?;
        let (catalog_id, catalog_obj) =
            catalog.ok_or_else(|| write_err("no catalog in input documents".to_string()))?;

        for (object_id, object) in page_objects.iter() {
            if let Ok(dictionary) = object.as_dict() {
                let mut dictionary = dictionary.clone();
                dictionary.set("Parent", pages_id);
                merged
                    .objects
                    .insert(*object_id, Object::Dictionary(dictionary));
            }
        }

        if let Ok(dictionary) = pages_obj.as_dict() {
            let mut dictionary = dictionary.clone();
            dictionary.set("Count", page_objects.len() as u32);
            dictionary.set(
                "Kids",
                page_objects
                    .keys()
                    .map(|id| Object::Reference(*id))
                    .collect::<Vec<_>>(),
            );
            merged.objects.insert(pages_id, Object::Dictionary(dictionary));
        }

        if let Ok(dictionary) = catalog_obj.as_dict() {
            let mut dictionary = dictionary.clone();
            dictionary.set("Pages", pages_id);
            dictionary.remove(b"Outlines");
            merged
                .objects
                .insert(catalog_id, Object::Dictionary(dictionary));
        }

        merged.trailer.set("Root", catalog_id);
        merged.max_id = merged.objects.len() as u32;
        merged.renumber_objects();
        merged.compress();
        merged
            .save(dest)
            .map_err(|err| write_err(err.to_string()))?;
        Ok(())
    }
}

/// Deterministic output path for one identifier: `<dir>/MT-<id>.pdf`
pub fn output_path(output_dir: &Path, identifier: &str) -> PathBuf {
    output_dir.join(format!("{OUTPUT_PREFIX}-{identifier}.pdf"))
}

/// Merge every complete pair into the output directory.
///
/// The output directory is created first; failure to create it is fatal
/// for the whole phase since nothing can be written. Per-pair failures
/// (unreadable or malformed inputs) are captured in the returned
/// `MergeOutcome` records and do not stop the remaining pairs.
pub fn merge_pairs(
    backend: &dyn MergeBackend,
    pairs: &BTreeMap<String, Pair>,
    output_dir: &Path,
) -> CasemergeResult<Vec<MergeOutcome>> {
    fs::create_dir_all(output_dir).map_err(|source| CasemergeError::OutputDirUnavailable {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut outcomes = Vec::with_capacity(pairs.len());
    for (identifier, pair) in pairs {
        let output = output_path(output_dir, identifier);
        let status = match merge_one(backend, pair, &output) {
            Ok(()) => MergeStatus::Merged,
            Err(err) => MergeStatus::Failed(err.to_string()),
        };
        outcomes.push(MergeOutcome {
            identifier: identifier.clone(),
            output,
            status,
        });
    }
    Ok(outcomes)
}

fn merge_one(backend: &dyn MergeBackend, pair: &Pair, output: &Path) -> CasemergeResult<()> {
    let mut appender = backend.appender();
    // Secondary first: the cover/signature pages open the merged file.
    appender.append(&pair.secondary)?;
    appender.append(&pair.primary)?;
    appender.write(output)
}
