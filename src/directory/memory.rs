//! In-memory directory adapters backing the demo server and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{
    AppraisalSnapshot, AppraisalSource, DirectoryError, EmployeeDirectory, EmployeeId,
    EmployeeProfile, EmployeeStatus, OrgDirectory, Role,
};

#[derive(Default, Clone)]
pub struct MemoryDirectory {
    employees: Arc<Mutex<HashMap<EmployeeId, EmployeeProfile>>>,
    roles: Arc<Mutex<HashMap<EmployeeId, Vec<Role>>>>,
    department_heads: Arc<Mutex<HashMap<String, EmployeeId>>>,
    appraisals: Arc<Mutex<HashMap<EmployeeId, AppraisalSnapshot>>>,
}

impl MemoryDirectory {
    pub fn upsert_employee(&self, profile: EmployeeProfile, roles: Vec<Role>) {
        self.employees
            .lock()
            .expect("directory mutex poisoned")
            .insert(profile.id.clone(), profile.clone());
        self.roles
            .lock()
            .expect("directory mutex poisoned")
            .insert(profile.id, roles);
    }

    pub fn set_department_head(&self, department: impl Into<String>, head: EmployeeId) {
        self.department_heads
            .lock()
            .expect("directory mutex poisoned")
            .insert(department.into(), head);
    }

    pub fn record_appraisal(&self, snapshot: AppraisalSnapshot) {
        self.appraisals
            .lock()
            .expect("directory mutex poisoned")
            .insert(snapshot.employee_id.clone(), snapshot);
    }
}

impl EmployeeDirectory for MemoryDirectory {
    fn find_employee(&self, id: &EmployeeId) -> Result<Option<EmployeeProfile>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_by_employee_number(
        &self,
        number: &str,
    ) -> Result<Option<EmployeeProfile>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .find(|profile| profile.employee_number == number)
            .cloned())
    }

    fn find_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<EmployeeProfile>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .filter(|profile| profile.department == department)
            .cloned()
            .collect())
    }

    fn find_by_role(&self, role: Role) -> Result<Vec<EmployeeProfile>, DirectoryError> {
        let roles = self.roles.lock().expect("directory mutex poisoned");
        let employees = self.employees.lock().expect("directory mutex poisoned");
        Ok(roles
            .iter()
            .filter(|(_, held)| held.contains(&role))
            .filter_map(|(id, _)| employees.get(id).cloned())
            .collect())
    }

    fn roles(&self, id: &EmployeeId) -> Result<Vec<Role>, DirectoryError> {
        let guard = self.roles.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned().unwrap_or_default())
    }

    fn update_status(
        &self,
        id: &EmployeeId,
        status: EmployeeStatus,
    ) -> Result<(), DirectoryError> {
        let mut guard = self.employees.lock().expect("directory mutex poisoned");
        match guard.get_mut(id) {
            Some(profile) => {
                profile.status = status;
                Ok(())
            }
            None => Err(DirectoryError::Unavailable(format!(
                "employee '{}' missing from directory",
                id.0
            ))),
        }
    }
}

impl OrgDirectory for MemoryDirectory {
    fn department_head(&self, department: &str) -> Result<Option<EmployeeId>, DirectoryError> {
        let guard = self
            .department_heads
            .lock()
            .expect("directory mutex poisoned");
        Ok(guard.get(department).cloned())
    }
}

impl AppraisalSource for MemoryDirectory {
    fn latest_appraisal(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<AppraisalSnapshot>, DirectoryError> {
        let guard = self.appraisals.lock().expect("directory mutex poisoned");
        Ok(guard.get(employee_id).cloned())
    }
}
