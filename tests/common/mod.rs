//! In-memory collaborators and a schema harness for the end-to-end tests.
//!
//! The mocks record how many mutating calls they received, so tests can
//! assert that a denied or not-found request never reached the data layer.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_graphql::{Request, ID};
use async_trait::async_trait;

use canopy_graphql::cms::{
    ContentCrud, ContentEntry, EntryCreateInput, EntryListQuery, EntryUpdateInput, EntryWhereInput,
};
use canopy_graphql::forms::{Form, FormCreateInput, FormStatus, FormUpdateInput, FormsCrud};
use canopy_graphql::users::{
    Group, GroupInput, InstallInput, SecurityCrud, User, UserCreateInput, UserUpdateInput,
};
use canopy_graphql::{
    build_schema, ApiGateway, ApiSchema, CrudError, CrudResult, DateTime, GatewayOptions, Identity,
    Permission, SecurityGateway,
};

pub struct MockSecurity {
    users: Mutex<Vec<User>>,
    groups: Mutex<Vec<Group>>,
    pub mutations: AtomicUsize,
}

impl MockSecurity {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            groups: Mutex::new(Vec::new()),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn resolve_group(&self, slug: Option<&str>) -> Option<Group> {
        let slug = slug?;
        self.groups
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.slug == slug)
            .cloned()
    }
}

#[async_trait]
impl SecurityCrud for MockSecurity {
    async fn get_user(&self, login: &str) -> CrudResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.login == login)
            .cloned())
    }

    async fn list_users(&self) -> CrudResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, data: UserCreateInput) -> CrudResult<User> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let group = self.resolve_group(data.group.as_deref());
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.login == data.login) {
            return Err(CrudError::new(
                "USER_EXISTS",
                "User with that login already exists.",
            ));
        }
        let user = User {
            login: data.login,
            first_name: data.first_name,
            last_name: data.last_name,
            group,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, login: &str, data: UserUpdateInput) -> CrudResult<User> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let group = self.resolve_group(data.group.as_deref());
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.login == login)
            .ok_or_else(|| CrudError::new("NOT_FOUND", format!(r#"User "{}" was not found!"#, login)))?;
        if let Some(first_name) = data.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = data.last_name {
            user.last_name = last_name;
        }
        if data.group.is_some() {
            user.group = group;
        }
        Ok(user.clone())
    }

    async fn delete_user(&self, login: &str) -> CrudResult<bool> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.login != login);
        Ok(users.len() < before)
    }

    async fn get_group(&self, slug: &str) -> CrudResult<Option<Group>> {
        Ok(self
            .groups
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.slug == slug)
            .cloned())
    }

    async fn create_group(&self, data: GroupInput) -> CrudResult<Group> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let group = Group {
            slug: data.slug,
            name: data.name,
        };
        self.groups.lock().unwrap().push(group.clone());
        Ok(group)
    }

    async fn install(&self, data: InstallInput) -> CrudResult<()> {
        let full_access = Group {
            slug: "full-access".to_string(),
            name: "Full Access".to_string(),
        };
        self.groups.lock().unwrap().push(full_access.clone());
        self.users.lock().unwrap().push(User {
            login: data.login,
            first_name: data.first_name,
            last_name: data.last_name,
            group: Some(full_access),
        });
        Ok(())
    }
}

pub struct MockPermissions {
    records: Vec<Permission>,
}

impl MockPermissions {
    pub fn new(records: Vec<Permission>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl SecurityGateway for MockPermissions {
    async fn get_permission(&self, name: &str) -> CrudResult<Option<Permission>> {
        Ok(self.records.iter().find(|p| p.name == name).cloned())
    }
}

pub struct MockForms {
    forms: Mutex<Vec<Form>>,
    pub mutations: AtomicUsize,
}

impl MockForms {
    pub fn new() -> Self {
        Self {
            forms: Mutex::new(Vec::new()),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FormsCrud for MockForms {
    async fn get_form(&self, id: &str) -> CrudResult<Option<Form>> {
        Ok(self
            .forms
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.id.as_str() == id)
            .cloned())
    }

    async fn list_forms(&self) -> CrudResult<Vec<Form>> {
        Ok(self.forms.lock().unwrap().clone())
    }

    async fn create_form(&self, data: FormCreateInput) -> CrudResult<Form> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let now = DateTime::now();
        let form = Form {
            id: ID::from(uuid::Uuid::new_v4().to_string()),
            name: data.name,
            version: 1,
            status: FormStatus::Draft,
            published: false,
            created_on: now,
            saved_on: now,
        };
        self.forms.lock().unwrap().push(form.clone());
        Ok(form)
    }

    async fn update_form(&self, id: &str, data: FormUpdateInput) -> CrudResult<Form> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut forms = self.forms.lock().unwrap();
        let form = forms
            .iter_mut()
            .find(|f| f.id.as_str() == id)
            .ok_or_else(|| CrudError::new("NOT_FOUND", format!(r#"Form with id:"{}" not found!"#, id)))?;
        if let Some(name) = data.name {
            form.name = name;
        }
        form.saved_on = DateTime::now();
        Ok(form.clone())
    }

    async fn delete_form(&self, id: &str) -> CrudResult<bool> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut forms = self.forms.lock().unwrap();
        let before = forms.len();
        forms.retain(|f| f.id.as_str() != id);
        Ok(forms.len() < before)
    }

    async fn publish_form(&self, id: &str) -> CrudResult<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut forms = self.forms.lock().unwrap();
        let form = forms
            .iter_mut()
            .find(|f| f.id.as_str() == id)
            .ok_or_else(|| CrudError::new("NOT_FOUND", format!(r#"Form with id:"{}" not found!"#, id)))?;
        form.status = FormStatus::Published;
        form.published = true;
        form.saved_on = DateTime::now();
        Ok(())
    }

    async fn un_publish_form(&self, id: &str) -> CrudResult<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut forms = self.forms.lock().unwrap();
        let form = forms
            .iter_mut()
            .find(|f| f.id.as_str() == id)
            .ok_or_else(|| CrudError::new("NOT_FOUND", format!(r#"Form with id:"{}" not found!"#, id)))?;
        form.status = FormStatus::Draft;
        form.published = false;
        form.saved_on = DateTime::now();
        Ok(())
    }
}

pub struct MockCms {
    entries: Mutex<Vec<ContentEntry>>,
    sequence: AtomicUsize,
    pub mutations: AtomicUsize,
}

impl MockCms {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            sequence: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        }
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentCrud for MockCms {
    async fn get_entry(
        &self,
        model: &str,
        filter: EntryWhereInput,
    ) -> CrudResult<Option<ContentEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.model == model && filter.matches(e))
            .cloned())
    }

    async fn get_entry_by_id(&self, id: &str) -> CrudResult<Option<ContentEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id.as_str() == id)
            .cloned())
    }

    async fn list_entries(&self, query: EntryListQuery) -> CrudResult<(Vec<ContentEntry>, i64)> {
        let entries = self.entries.lock().unwrap();
        let mut matched: Vec<ContentEntry> = entries
            .iter()
            .filter(|e| e.model == query.model)
            .filter(|e| query.filter.as_ref().map_or(true, |f| f.matches(e)))
            .cloned()
            .collect();
        if let Some(sorters) = &query.sort {
            matched.sort_by(|a, b| {
                for sorter in sorters {
                    let ordering = sorter.compare(a, b);
                    if ordering != std::cmp::Ordering::Equal {
                        return ordering;
                    }
                }
                std::cmp::Ordering::Equal
            });
        }
        let total = matched.len() as i64;
        let page: Vec<ContentEntry> = matched
            .into_iter()
            .skip(query.offset)
            .take(query.limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn create_entry(&self, model: &str, data: EntryCreateInput) -> CrudResult<ContentEntry> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let now = DateTime::now();
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let entry = ContentEntry {
            id: ID::from(format!("entry-{}", sequence)),
            model: model.to_string(),
            title: data.title,
            values: data
                .values
                .unwrap_or_else(|| async_graphql::Json(serde_json::json!({}))),
            created_on: now,
            updated_on: now,
            saved_on: now,
        };
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn update_entry(&self, id: &str, data: EntryUpdateInput) -> CrudResult<ContentEntry> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .iter_mut()
            .find(|e| e.id.as_str() == id)
            .ok_or_else(|| {
                CrudError::new("NOT_FOUND", format!(r#"Entry with id:"{}" not found!"#, id))
            })?;
        if let Some(title) = data.title {
            entry.title = title;
        }
        if let Some(values) = data.values {
            entry.values = values;
        }
        let now = DateTime::now();
        entry.updated_on = now;
        entry.saved_on = now;
        Ok(entry.clone())
    }

    async fn delete_entry(&self, id: &str) -> CrudResult<bool> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| e.id.as_str() != id);
        Ok(entries.len() < before)
    }
}

/// Schema plus gateway wired to the in-memory collaborators.
pub struct TestApi {
    pub schema: ApiSchema,
    pub gateway: ApiGateway,
    pub security: Arc<MockSecurity>,
    pub forms: Arc<MockForms>,
    pub cms: Arc<MockCms>,
}

impl TestApi {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self::with_options(permissions, GatewayOptions::default())
    }

    pub fn with_options(permissions: Vec<Permission>, options: GatewayOptions) -> Self {
        let security = Arc::new(MockSecurity::new());
        let forms = Arc::new(MockForms::new());
        let cms = Arc::new(MockCms::new());
        let gateway = ApiGateway::new(
            security.clone(),
            forms.clone(),
            cms.clone(),
            Arc::new(MockPermissions::new(permissions)),
            options,
        );
        Self {
            schema: build_schema(),
            gateway,
            security,
            forms,
            cms,
        }
    }

    /// Execute a query as the default admin identity and return the data
    /// payload as JSON.
    pub async fn execute(&self, query: &str) -> serde_json::Value {
        let identity = Identity::new("admin-id", "admin");
        let request = Request::new(query).data(self.gateway.context(identity));
        let response = self.schema.execute(request).await;
        assert!(
            response.errors.is_empty(),
            "unexpected GraphQL errors: {:?}",
            response.errors
        );
        response.data.into_json().expect("data should serialize")
    }

    /// Seed the default admin user and `full-access` group.
    pub async fn install(&self) {
        let response = self
            .execute(
                r#"mutation {
                    security {
                        install(data: { firstName: "John", lastName: "Doe", login: "admin@canopy.test" }) {
                            data
                            error { code message }
                        }
                    }
                }"#,
            )
            .await;
        assert_eq!(
            response,
            serde_json::json!({
                "security": { "install": { "data": true, "error": null } }
            })
        );
    }
}
