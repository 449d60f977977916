use crate::{DomainError, LocalImage, PreviewHandle, RemoteImage};

/// Where a slot index points inside the backing lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackingRef {
    Remote(usize),
    Local(usize),
}

/// The authoritative image lists of a listing form: images already persisted
/// remotely, followed by new local captures with their preview handles.
///
/// `new_files` and `new_previews` are parallel; they are only mutated
/// together so index `i` of one always pairs with index `i` of the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackingLists {
    existing_remote: Vec<RemoteImage>,
    new_files: Vec<LocalImage>,
    new_previews: Vec<PreviewHandle>,
}

impl BackingLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(existing_remote: Vec<RemoteImage>) -> Self {
        Self {
            existing_remote,
            ..Self::default()
        }
    }

    pub fn from_parts(
        existing_remote: Vec<RemoteImage>,
        new_files: Vec<LocalImage>,
        new_previews: Vec<PreviewHandle>,
    ) -> Result<Self, DomainError> {
        if new_files.len() != new_previews.len() {
            return Err(DomainError::MismatchedLocalLists {
                files: new_files.len(),
                previews: new_previews.len(),
            });
        }
        Ok(Self {
            existing_remote,
            new_files,
            new_previews,
        })
    }

    pub fn into_parts(self) -> (Vec<RemoteImage>, Vec<LocalImage>, Vec<PreviewHandle>) {
        (self.existing_remote, self.new_files, self.new_previews)
    }

    pub fn existing_remote(&self) -> &[RemoteImage] {
        &self.existing_remote
    }

    pub fn new_files(&self) -> &[LocalImage] {
        &self.new_files
    }

    pub fn new_previews(&self) -> &[PreviewHandle] {
        &self.new_previews
    }

    pub fn len(&self) -> usize {
        self.existing_remote.len() + self.new_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn locate(&self, slot_index: usize) -> Option<BackingRef> {
        let remote_len = self.existing_remote.len();
        if slot_index < remote_len {
            return Some(BackingRef::Remote(slot_index));
        }
        let local_index = slot_index - remote_len;
        (local_index < self.new_files.len()).then_some(BackingRef::Local(local_index))
    }

    pub fn push_remote(&mut self, image: RemoteImage) {
        self.existing_remote.push(image);
    }

    pub fn push_local(&mut self, file: LocalImage, preview: PreviewHandle) {
        self.new_files.push(file);
        self.new_previews.push(preview);
    }

    /// Overwrites a local entry in place and hands back the displaced preview.
    pub fn replace_local(
        &mut self,
        local_index: usize,
        file: LocalImage,
        preview: PreviewHandle,
    ) -> Option<PreviewHandle> {
        if local_index >= self.new_files.len() {
            return None;
        }
        self.new_files[local_index] = file;
        Some(std::mem::replace(
            &mut self.new_previews[local_index],
            preview,
        ))
    }

    pub fn remove_local(&mut self, local_index: usize) -> Option<(LocalImage, PreviewHandle)> {
        if local_index >= self.new_files.len() {
            return None;
        }
        let file = self.new_files.remove(local_index);
        let preview = self.new_previews.remove(local_index);
        Some((file, preview))
    }

    pub fn remove_remote(&mut self, index: usize) -> Option<RemoteImage> {
        (index < self.existing_remote.len()).then(|| self.existing_remote.remove(index))
    }
}
