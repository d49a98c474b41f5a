use crate::Dataset;
use tracing::*;

/// State of the single viewer session: the dataset currently loaded, or the
/// reason the last upload was rejected.
#[derive(Debug, Clone, Default)]
pub struct Session {
    dataset: Option<Dataset>,
    error: Option<String>,
    file_name: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the session contents with a freshly uploaded file. A rejected
    /// upload clears the previous dataset and keeps the error message.
    pub fn load(&mut self, bytes: &[u8], file_name: Option<&str>) {
        self.file_name = file_name.map(str::to_string);
        match Dataset::from_bytes(bytes) {
            Ok(dataset) => {
                info!(
                    "Loaded upload {:?}: {} rows, {} neutral structures",
                    self.file_name,
                    dataset.len(),
                    dataset.neutral_options().len()
                );
                self.dataset = Some(dataset);
                self.error = None;
            }
            Err(e) => {
                warn!("Rejected upload {:?}: {}", self.file_name, e);
                self.dataset = None;
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
        self.error = None;
    }

    pub fn reset(&mut self) {
        debug!("Clearing session");
        *self = Self::default();
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_and_reset() {
        let mut session = Session::new();
        assert!(session.dataset().is_none());
        assert!(session.error().is_none());

        session.load(b"Neutral_smiles,Protonated_smiles\nN,[NH4+]\n", Some("pairs.csv"));
        assert_eq!(session.file_name(), Some("pairs.csv"));
        assert_eq!(session.dataset().map(Dataset::len), Some(1));
        assert!(session.error().is_none());

        session.reset();
        assert!(session.dataset().is_none());
        assert!(session.file_name().is_none());
    }

    #[test]
    fn test_rejected_upload_replaces_dataset() {
        let mut session = Session::new();
        session.load(b"Neutral_smiles,Protonated_smiles\nN,[NH4+]\n", None);
        session.load(b"Neutral_smiles\nN\n", Some("bad.csv"));
        assert!(session.dataset().is_none());
        assert_eq!(
            session.error(),
            Some("Error: The CSV file must contain 'Neutral_smiles' and 'Protonated_smiles' columns.")
        );

        session.set_dataset(Dataset::from_rows([("C", "[CH5+]")]));
        assert!(session.error().is_none());
    }
}
