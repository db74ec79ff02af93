//! # File-backed Employee Repository
//!
//! Keeps the employee table in memory and rewrites a JSON file after every
//! mutation. Writes go to a temp file, are fsynced, then renamed over the
//! data file so a crash never leaves a half-written table.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::model::{CreateEmployeeRequest, Employee, EmployeeFilter, UpdateEmployeeRequest};
use super::repository::{EmployeeRepository, EmployeeTable};

/// Employee repository persisted to a JSON file
#[derive(Debug)]
pub struct JsonFileEmployeeRepository {
    path: PathBuf,
    temp_path: PathBuf,
    table: RwLock<EmployeeTable>,
}

impl JsonFileEmployeeRepository {
    /// Open the repository, loading the table if the file exists
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let temp_path = path.with_extension("json.tmp");

        let table = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            EmployeeTable::default()
        };

        Ok(Self {
            path,
            temp_path,
            table: RwLock::new(table),
        })
    }

    /// Path of the data file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, table: &EmployeeTable) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(table)?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.temp_path)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;

        fs::rename(&self.temp_path, &self.path)?;

        if let Some(parent) = self.path.parent() {
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }

        Ok(())
    }

    /// Run a mutation against a copy of the table, persist it, then commit.
    fn mutate<F>(&self, op: F) -> StoreResult<Employee>
    where
        F: FnOnce(&mut EmployeeTable) -> StoreResult<Employee>,
    {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = table.clone();
        let result = op(&mut next)?;
        self.persist(&next)?;
        *table = next;
        Ok(result)
    }
}

impl EmployeeRepository for JsonFileEmployeeRepository {
    fn find_by_id(&self, id: i64) -> StoreResult<Option<Employee>> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> StoreResult<Option<Employee>> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.get_by_email(email).cloned())
    }

    fn find_many(&self, filter: EmployeeFilter) -> StoreResult<Vec<Employee>> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.select(filter))
    }

    fn create(&self, data: &CreateEmployeeRequest) -> StoreResult<Employee> {
        self.mutate(|table| table.insert(data))
    }

    fn update(&self, id: i64, changes: &UpdateEmployeeRequest) -> StoreResult<Employee> {
        self.mutate(|table| table.apply(id, changes))
    }

    fn delete(&self, id: i64) -> StoreResult<Employee> {
        self.mutate(|table| table.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employees::model::Role;
    use tempfile::TempDir;

    fn create_request(email: &str) -> CreateEmployeeRequest {
        CreateEmployeeRequest {
            name: "Grace".to_string(),
            email: email.to_string(),
            role: Role::Engineer,
        }
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonFileEmployeeRepository::open(tmp.path().join("employees.json")).unwrap();
        assert!(repo.find_many(EmployeeFilter::default()).unwrap().is_empty());
        assert!(!repo.path().exists());
    }

    #[test]
    fn test_state_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data").join("employees.json");

        {
            let repo = JsonFileEmployeeRepository::open(&path).unwrap();
            repo.create(&create_request("a@example.com")).unwrap();
            repo.create(&create_request("b@example.com")).unwrap();
            repo.delete(2).unwrap();
        }

        let reopened = JsonFileEmployeeRepository::open(&path).unwrap();
        let all = reopened.find_many(EmployeeFilter::default()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email, "a@example.com");

        // Autoincrement counter is persisted too
        let next = reopened.create(&create_request("c@example.com")).unwrap();
        assert_eq!(next.id, 3);
    }

    #[test]
    fn test_failed_mutation_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("employees.json");
        let repo = JsonFileEmployeeRepository::open(&path).unwrap();
        repo.create(&create_request("a@example.com")).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert!(matches!(
            repo.create(&create_request("a@example.com")),
            Err(StoreError::EmailConflict(_))
        ));
        assert!(matches!(repo.delete(99), Err(StoreError::NotFound(99))));

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("employees.json");
        fs::write(&path, "not json").unwrap();

        let result = JsonFileEmployeeRepository::open(&path);
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
