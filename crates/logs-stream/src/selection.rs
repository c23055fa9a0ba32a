use cc_logs_core::proto::{InstanceId, InstanceRef, LogRecord};

/// Instances whose records are shown. An empty selection shows everything.
///
/// Filtering never reorders records: the view keeps global arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceSelection {
    ids: Vec<InstanceId>,
}

impl InstanceSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_instances<'a>(instances: impl IntoIterator<Item = &'a InstanceRef>) -> Self {
        let mut selection = Self::default();
        for instance in instances {
            selection.select(instance.id());
        }
        selection
    }

    pub fn select(&mut self, id: impl Into<InstanceId>) -> bool {
        let id = id.into();
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|selected| selected != id);
        before != self.ids.len()
    }

    pub fn ids(&self) -> &[InstanceId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Records without an instance id only match the empty selection.
    pub fn matches(&self, record: &LogRecord) -> bool {
        if self.ids.is_empty() {
            return true;
        }
        record
            .instance_id()
            .is_some_and(|id| self.ids.iter().any(|selected| selected == id))
    }

    pub fn filter<'a>(
        &'a self,
        records: impl IntoIterator<Item = &'a LogRecord> + 'a,
    ) -> impl Iterator<Item = &'a LogRecord> + 'a {
        records.into_iter().filter(move |r| self.matches(r))
    }
}
