use std::collections::BTreeMap;
use std::path::PathBuf;

use lopdf::{dictionary, Document, Object, ObjectId};
use uuid::Uuid;

use super::locks::OwnerLocks;
use super::RenderError;
use crate::pipeline::storage;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: &[&str] = &["Resources", "MediaBox", "CropBox", "Rotate"];
const MAX_TREE_DEPTH: usize = 64;

/// Publishes the single current bundle per owner in the merged storage area.
pub struct BundleMerger {
    merged_dir: PathBuf,
    locks: OwnerLocks,
}

impl BundleMerger {
    pub fn new(merged_dir: PathBuf) -> Self {
        Self {
            merged_dir,
            locks: OwnerLocks::new(),
        }
    }

    pub fn bundle_path(&self, owner_id: &Uuid) -> PathBuf {
        self.merged_dir
            .join(format!("Merged_Documents_{owner_id}.pdf"))
    }

    /// Concatenate the pages of `ordered_paths` into the owner's bundle,
    /// replacing any previous one. Missing files are skipped. Runs under the
    /// owner's lock so concurrent publishes never interleave.
    pub async fn merge_pdf_files(
        &self,
        ordered_paths: &[PathBuf],
        owner_id: &Uuid,
    ) -> Result<PathBuf, RenderError> {
        if ordered_paths.is_empty() {
            return Err(RenderError::NothingToMerge);
        }

        let _guard = self.locks.acquire(owner_id).await;

        let mut sources = Vec::with_capacity(ordered_paths.len());
        for path in ordered_paths {
            match tokio::fs::read(path).await {
                Ok(bytes) => sources.push((path.display().to_string(), bytes)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(path = %path.display(), "Skipping missing PDF during merge");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let included = sources.len();
        let merged = tokio::task::spawn_blocking(move || merge_documents(sources))
            .await
            .map_err(|e| RenderError::TaskFailed(e.to_string()))??;

        let target = self.bundle_path(owner_id);
        storage::write_atomically(&target, &merged).await?;

        tracing::info!(
            owner_id = %owner_id,
            requested = ordered_paths.len(),
            included,
            path = %target.display(),
            "Bundle published"
        );
        Ok(target)
    }

    pub async fn get_latest_merged_pdf_path(&self, owner_id: &Uuid) -> Result<PathBuf, RenderError> {
        let path = self.bundle_path(owner_id);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Ok(path)
        } else {
            Err(RenderError::BundleNotFound(*owner_id))
        }
    }
}

/// Merge already-loaded PDFs, keeping page order within and across inputs.
pub fn merge_documents(sources: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>, RenderError> {
    let mut merged = Document::with_version("1.5");
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut next_id = 1;

    for (label, bytes) in sources {
        let mut doc = Document::load_mem(&bytes).map_err(|e| RenderError::UnreadableInput {
            path: label.clone(),
            reason: e.to_string(),
        })?;
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        for page_id in doc.get_pages().into_values() {
            let inherited = inherited_attributes(&doc, page_id);
            if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
                for (key, value) in inherited {
                    if !page.has(key.as_bytes()) {
                        page.set(key, value);
                    }
                }
            }
            page_ids.push(page_id);
        }

        tracing::debug!(source = %label, pages = page_ids.len(), "PDF queued for merge");
        objects.extend(doc.objects);
    }

    merged.objects = objects;
    merged.max_id = next_id.saturating_sub(1).max(1);

    let pages_id = merged.new_object_id();
    for page_id in &page_ids {
        if let Ok(Object::Dictionary(page)) = merged.get_object_mut(*page_id) {
            page.set("Parent", pages_id);
        }
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );
    let catalog_id = merged.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    merged.trailer.set("Root", catalog_id);

    merged.prune_objects();
    merged.renumber_objects();

    let mut buf = Vec::new();
    merged
        .save_to(&mut buf)
        .map_err(|e| RenderError::Pdf(format!("Merged PDF save error: {e}")))?;
    Ok(buf)
}

/// Attributes the page itself lacks but an ancestor `Pages` node defines.
/// Nearest ancestor wins.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static str, Object)> {
    let mut found: Vec<(&'static str, Object)> = Vec::new();
    let mut current = parent_of(doc, page_id);
    let mut depth = 0;

    while let Some(node_id) = current {
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        for key in INHERITABLE_KEYS {
            if found.iter().any(|(k, _)| k == key) {
                continue;
            }
            if let Ok(value) = node.get(key.as_bytes()) {
                found.push((key, value.clone()));
            }
        }
        current = parent_of(doc, node_id);
        depth += 1;
    }
    found
}

fn parent_of(doc: &Document, id: ObjectId) -> Option<ObjectId> {
    doc.get_dictionary(id)
        .ok()?
        .get(b"Parent")
        .ok()?
        .as_reference()
        .ok()
}
