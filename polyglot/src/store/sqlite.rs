//! SQLite implementation of [`TranslationStore`].

use chrono::Utc;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use std::{collections::HashMap, path::Path, time::Duration};
use uuid::Uuid;

use super::{
    ComponentContext, ImportRequest, ResourceFileSnapshot, StoreError, TranslationStore,
};
use crate::types::{
    Component, Project, ResourceFile, ResourceTranslation, Solution, TranslatableResource,
    TranslationNeed,
};

const SCHEMA: &str = r#"
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS solutions (
    id   BLOB PRIMARY KEY,
    code TEXT NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id          BLOB PRIMARY KEY,
    solution_id BLOB NOT NULL REFERENCES solutions(id) ON DELETE CASCADE,
    code        TEXT NOT NULL,
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS components (
    id         BLOB PRIMARY KEY,
    project_id BLOB NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    code       TEXT NOT NULL,
    name       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS translation_needs (
    id          BLOB PRIMARY KEY,
    solution_id BLOB NOT NULL REFERENCES solutions(id) ON DELETE CASCADE,
    code        TEXT NOT NULL,
    label       TEXT NOT NULL,
    is_default  INTEGER NOT NULL DEFAULT 0,
    UNIQUE (solution_id, code)
);

CREATE TABLE IF NOT EXISTS resource_files (
    id           BLOB PRIMARY KEY,
    name         TEXT NOT NULL,
    path         TEXT NOT NULL DEFAULT '',
    project_id   BLOB NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
    component_id BLOB NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    UNIQUE (component_id, name)
);

CREATE TABLE IF NOT EXISTS translatable_resources (
    id               BLOB PRIMARY KEY,
    resource_file_id BLOB NOT NULL REFERENCES resource_files(id) ON DELETE CASCADE,
    position         INTEGER NOT NULL,
    key              TEXT NOT NULL,
    source_value     TEXT NOT NULL,
    description      TEXT,
    UNIQUE (resource_file_id, key)
);

CREATE TABLE IF NOT EXISTS resource_translations (
    id                       BLOB PRIMARY KEY,
    translatable_resource_id BLOB NOT NULL REFERENCES translatable_resources(id) ON DELETE CASCADE,
    translation_need_id      BLOB NOT NULL REFERENCES translation_needs(id) ON DELETE CASCADE,
    validated_value          TEXT,
    suggested_value          TEXT,
    status                   TEXT NOT NULL,
    last_modified_date       TEXT NOT NULL,
    UNIQUE (translatable_resource_id, translation_need_id)
);
"#;

const TRANSLATION_COLUMNS: &str = "t.id, t.translatable_resource_id, t.translation_need_id, n.code, \
     t.validated_value, t.suggested_value, t.status, t.last_modified_date";

/// A [`TranslationStore`] backed by one SQLite connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (and bootstraps) the database file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore { conn })
    }

    pub fn create_solution(&self, code: &str, name: &str) -> Result<Solution, StoreError> {
        let solution = Solution {
            id: Uuid::new_v4(),
            code: code.to_string(),
            name: name.to_string(),
        };
        self.conn.execute(
            "INSERT INTO solutions (id, code, name) VALUES (?1, ?2, ?3)",
            params![solution.id, solution.code, solution.name],
        )?;
        Ok(solution)
    }

    pub fn create_project(
        &self,
        solution_id: Uuid,
        code: &str,
        name: &str,
    ) -> Result<Project, StoreError> {
        self.ensure_exists("solutions", "solution", solution_id)?;
        let project = Project {
            id: Uuid::new_v4(),
            solution_id,
            code: code.to_string(),
            name: name.to_string(),
        };
        self.conn.execute(
            "INSERT INTO projects (id, solution_id, code, name) VALUES (?1, ?2, ?3, ?4)",
            params![project.id, project.solution_id, project.code, project.name],
        )?;
        Ok(project)
    }

    pub fn create_component(
        &self,
        project_id: Uuid,
        code: &str,
        name: &str,
    ) -> Result<Component, StoreError> {
        self.ensure_exists("projects", "project", project_id)?;
        let component = Component {
            id: Uuid::new_v4(),
            project_id,
            code: code.to_string(),
            name: name.to_string(),
        };
        self.conn.execute(
            "INSERT INTO components (id, project_id, code, name) VALUES (?1, ?2, ?3, ?4)",
            params![component.id, component.project_id, component.code, component.name],
        )?;
        Ok(component)
    }

    /// Translation needs of a solution, ordered by code.
    pub fn translation_needs(&self, solution_id: Uuid) -> Result<Vec<TranslationNeed>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, solution_id, code, label, is_default FROM translation_needs
             WHERE solution_id = ?1 ORDER BY code",
        )?;
        let needs = stmt
            .query_map(params![solution_id], |row| {
                Ok(TranslationNeed {
                    id: row.get(0)?,
                    solution_id: row.get(1)?,
                    code: row.get(2)?,
                    label: row.get(3)?,
                    is_default: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(needs)
    }

    /// Resource files of a component, ordered by name.
    pub fn resource_files(&self, component_id: Uuid) -> Result<Vec<ResourceFile>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, path, project_id, component_id FROM resource_files
             WHERE component_id = ?1 ORDER BY name",
        )?;
        let files = stmt
            .query_map(params![component_id], resource_file_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(files)
    }

    /// Deletes a resource file with its resources and translations.
    pub fn delete_resource_file(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM resource_files WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Sets the validated value of `resource_id` in `language`, creating the
    /// translation need and the translation when missing.
    pub fn set_validated_value(
        &mut self,
        resource_id: Uuid,
        language: &str,
        value: &str,
    ) -> Result<ResourceTranslation, StoreError> {
        let tx = self.conn.transaction()?;

        let solution_id: Uuid = tx
            .query_row(
                "SELECT p.solution_id FROM translatable_resources r
                 JOIN resource_files f ON f.id = r.resource_file_id
                 JOIN projects p ON p.id = f.project_id
                 WHERE r.id = ?1",
                params![resource_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound {
                entity: "translatable resource",
                id: resource_id,
            })?;
        let need_id = find_or_create_need(&tx, solution_id, language)?;
        let now = Utc::now();

        let updated = tx.execute(
            "UPDATE resource_translations
             SET validated_value = ?1, status = 'validated', last_modified_date = ?2
             WHERE translatable_resource_id = ?3 AND translation_need_id = ?4",
            params![value, now, resource_id, need_id],
        )?;
        if updated == 0 {
            tx.execute(
                "INSERT INTO resource_translations
                 (id, translatable_resource_id, translation_need_id, validated_value,
                  suggested_value, status, last_modified_date)
                 VALUES (?1, ?2, ?3, ?4, NULL, 'validated', ?5)",
                params![Uuid::new_v4(), resource_id, need_id, value, now],
            )?;
        }

        let translation = tx.query_row(
            &format!(
                "SELECT {TRANSLATION_COLUMNS} FROM resource_translations t
                 JOIN translation_needs n ON n.id = t.translation_need_id
                 WHERE t.translatable_resource_id = ?1 AND t.translation_need_id = ?2"
            ),
            params![resource_id, need_id],
            translation_from_row,
        )?;
        tx.commit()?;

        log::debug!("validated `{language}` value of resource {resource_id}");
        Ok(translation)
    }

    fn ensure_exists(&self, table: &str, entity: &'static str, id: Uuid) -> Result<(), StoreError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {table} WHERE id = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        found.map(|_| ()).ok_or(StoreError::NotFound { entity, id })
    }
}

impl TranslationStore for SqliteStore {
    fn find_component(&self, id: Uuid) -> Result<Option<ComponentContext>, StoreError> {
        let context = self
            .conn
            .query_row(
                "SELECT c.id, c.project_id, c.code, c.name, p.solution_id, p.code, p.name
                 FROM components c JOIN projects p ON p.id = c.project_id
                 WHERE c.id = ?1",
                params![id],
                |row| {
                    Ok(ComponentContext {
                        component: Component {
                            id: row.get(0)?,
                            project_id: row.get(1)?,
                            code: row.get(2)?,
                            name: row.get(3)?,
                        },
                        project: Project {
                            id: row.get(1)?,
                            solution_id: row.get(4)?,
                            code: row.get(5)?,
                            name: row.get(6)?,
                        },
                    })
                },
            )
            .optional()?;
        Ok(context)
    }

    fn resource_file_exists(&self, component_id: Uuid, name: &str) -> Result<bool, StoreError> {
        let exists = self.conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM resource_files WHERE component_id = ?1 AND name = ?2)",
            params![component_id, name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn import(&mut self, request: ImportRequest) -> Result<ResourceFile, StoreError> {
        let tx = self.conn.transaction()?;

        let file = ResourceFile {
            id: Uuid::new_v4(),
            name: request.name,
            path: String::new(),
            project_id: request.project_id,
            component_id: request.component_id,
        };
        tx.execute(
            "INSERT INTO resource_files (id, name, path, project_id, component_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![file.id, file.name, file.path, file.project_id, file.component_id],
        )
        .map_err(|e| {
            if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
                StoreError::Conflict {
                    component_id: file.component_id,
                    name: file.name.clone(),
                }
            } else {
                StoreError::Sqlite(e)
            }
        })?;

        let now = Utc::now();
        let mut needs: HashMap<String, Uuid> = HashMap::new();
        let mut translation_count = 0usize;

        for (position, resource) in request.resources.iter().enumerate() {
            let resource_id = Uuid::new_v4();
            tx.execute(
                "INSERT INTO translatable_resources
                 (id, resource_file_id, position, key, source_value, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    resource_id,
                    file.id,
                    position as i64,
                    resource.key,
                    resource.source_value,
                    resource.description
                ],
            )?;

            for translation in &resource.translations {
                let need_id = match needs.get(&translation.language) {
                    Some(id) => *id,
                    None => {
                        let id = find_or_create_need(&tx, request.solution_id, &translation.language)?;
                        needs.insert(translation.language.clone(), id);
                        id
                    }
                };
                tx.execute(
                    "INSERT INTO resource_translations
                     (id, translatable_resource_id, translation_need_id, validated_value,
                      suggested_value, status, last_modified_date)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        Uuid::new_v4(),
                        resource_id,
                        need_id,
                        translation.validated_value,
                        translation.suggested_value,
                        translation.status,
                        now
                    ],
                )?;
                translation_count += 1;
            }
        }

        tx.commit()?;
        log::debug!(
            "stored `{}`: {} resources, {} translations",
            file.name,
            request.resources.len(),
            translation_count
        );
        Ok(file)
    }

    fn load_resource_file(&self, id: Uuid) -> Result<Option<ResourceFileSnapshot>, StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        let Some(file) = tx
            .query_row(
                "SELECT id, name, path, project_id, component_id FROM resource_files WHERE id = ?1",
                params![id],
                resource_file_from_row,
            )
            .optional()?
        else {
            return Ok(None);
        };

        let resources = {
            let mut stmt = tx.prepare(
                "SELECT id, resource_file_id, key, source_value, description
                 FROM translatable_resources WHERE resource_file_id = ?1 ORDER BY position",
            )?;
            stmt.query_map(params![id], |row| {
                Ok(TranslatableResource {
                    id: row.get(0)?,
                    resource_file_id: row.get(1)?,
                    key: row.get(2)?,
                    source_value: row.get(3)?,
                    description: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?
        };

        let translations = {
            let mut stmt = tx.prepare(&format!(
                "SELECT {TRANSLATION_COLUMNS} FROM resource_translations t
                 JOIN translation_needs n ON n.id = t.translation_need_id
                 JOIN translatable_resources r ON r.id = t.translatable_resource_id
                 WHERE r.resource_file_id = ?1
                 ORDER BY r.position, t.rowid"
            ))?;
            stmt.query_map(params![id], translation_from_row)?
                .collect::<Result<Vec<_>, _>>()?
        };

        tx.commit()?;
        Ok(Some(ResourceFileSnapshot {
            file,
            resources,
            translations,
        }))
    }
}

fn find_or_create_need(
    conn: &Connection,
    solution_id: Uuid,
    code: &str,
) -> Result<Uuid, rusqlite::Error> {
    let existing: Option<Uuid> = conn
        .query_row(
            "SELECT id FROM translation_needs WHERE solution_id = ?1 AND code = ?2",
            params![solution_id, code],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO translation_needs (id, solution_id, code, label, is_default)
         VALUES (?1, ?2, ?3, ?3, 0)",
        params![id, solution_id, code],
    )?;
    log::info!("created translation need `{code}` in solution {solution_id}");
    Ok(id)
}

fn resource_file_from_row(row: &Row<'_>) -> rusqlite::Result<ResourceFile> {
    Ok(ResourceFile {
        id: row.get(0)?,
        name: row.get(1)?,
        path: row.get(2)?,
        project_id: row.get(3)?,
        component_id: row.get(4)?,
    })
}

fn translation_from_row(row: &Row<'_>) -> rusqlite::Result<ResourceTranslation> {
    Ok(ResourceTranslation {
        id: row.get(0)?,
        translatable_resource_id: row.get(1)?,
        translation_need_id: row.get(2)?,
        language: row.get(3)?,
        validated_value: row.get(4)?,
        suggested_value: row.get(5)?,
        status: row.get(6)?,
        last_modified_date: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ImportedResource, ImportedTranslation};

    fn seeded() -> (SqliteStore, Component, Project) {
        let store = SqliteStore::open_in_memory().unwrap();
        let solution = store.create_solution("sol", "Solution").unwrap();
        let project = store.create_project(solution.id, "proj", "Project").unwrap();
        let component = store.create_component(project.id, "comp", "Component").unwrap();
        (store, component, project)
    }

    fn request(component: &Component, project: &Project, name: &str) -> ImportRequest {
        ImportRequest {
            name: name.to_string(),
            component_id: component.id,
            project_id: project.id,
            solution_id: project.solution_id,
            resources: vec![
                ImportedResource {
                    key: "Hello".to_string(),
                    source_value: "Hello".to_string(),
                    description: Some("Greeting".to_string()),
                    translations: vec![
                        ImportedTranslation {
                            language: "en".to_string(),
                            validated_value: Some("Hello".to_string()),
                            suggested_value: None,
                            status: "imported".to_string(),
                        },
                        ImportedTranslation {
                            language: "fr".to_string(),
                            validated_value: Some("Bonjour".to_string()),
                            suggested_value: None,
                            status: "imported".to_string(),
                        },
                    ],
                },
                ImportedResource {
                    key: "World".to_string(),
                    source_value: "World".to_string(),
                    description: None,
                    translations: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_find_component() {
        let (store, component, project) = seeded();
        let context = store.find_component(component.id).unwrap().unwrap();
        assert_eq!(context.component, component);
        assert_eq!(context.project, project);
        assert!(store.find_component(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_import_and_load() {
        let (mut store, component, project) = seeded();
        let file = store.import(request(&component, &project, "test.json")).unwrap();
        assert_eq!(file.name, "test.json");
        assert!(store.resource_file_exists(component.id, "test.json").unwrap());

        let snapshot = store.load_resource_file(file.id).unwrap().unwrap();
        assert_eq!(snapshot.file, file);
        let keys: Vec<_> = snapshot.resources.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Hello", "World"]);
        assert_eq!(snapshot.resources[0].description.as_deref(), Some("Greeting"));

        let languages: Vec<_> = snapshot.translations.iter().map(|t| t.language.as_str()).collect();
        assert_eq!(languages, vec!["en", "fr"]);
        assert_eq!(snapshot.translations[1].validated_value.as_deref(), Some("Bonjour"));

        let needs = store.translation_needs(project.solution_id).unwrap();
        let codes: Vec<_> = needs.iter().map(|n| n.code.as_str()).collect();
        assert_eq!(codes, vec!["en", "fr"]);
    }

    #[test]
    fn test_duplicate_name_is_a_conflict_and_writes_nothing() {
        let (mut store, component, project) = seeded();
        store.import(request(&component, &project, "test.json")).unwrap();

        let err = store
            .import(request(&component, &project, "test.json"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { ref name, .. } if name == "test.json"));

        let resources: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM translatable_resources", [], |row| row.get(0))
            .unwrap();
        assert_eq!(resources, 2);
        assert_eq!(store.resource_files(component.id).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_import_rolls_back() {
        let (mut store, component, project) = seeded();
        let mut bad = request(&component, &project, "dup.json");
        // duplicate key violates UNIQUE (resource_file_id, key) after the file row exists
        bad.resources.push(bad.resources[0].clone());

        assert!(store.import(bad).is_err());
        assert!(!store.resource_file_exists(component.id, "dup.json").unwrap());
        assert!(store.translation_needs(project.solution_id).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_loads_none() {
        let (store, _, _) = seeded();
        assert!(store.load_resource_file(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_set_validated_value() {
        let (mut store, component, project) = seeded();
        let file = store.import(request(&component, &project, "test.json")).unwrap();
        let snapshot = store.load_resource_file(file.id).unwrap().unwrap();
        let world = snapshot.resources[1].id;

        let created = store.set_validated_value(world, "de", "Welt").unwrap();
        assert_eq!(created.language, "de");
        assert_eq!(created.validated_value.as_deref(), Some("Welt"));
        assert_eq!(created.status, "validated");

        let updated = store.set_validated_value(world, "de", "Erde").unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.validated_value.as_deref(), Some("Erde"));

        assert!(matches!(
            store.set_validated_value(Uuid::new_v4(), "de", "x"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polyglot.sqlite");

        let component_id = {
            let store = SqliteStore::open(&path).unwrap();
            let solution = store.create_solution("sol", "Solution").unwrap();
            let project = store.create_project(solution.id, "proj", "Project").unwrap();
            store.create_component(project.id, "comp", "Component").unwrap().id
        };

        let reopened = SqliteStore::open(&path).unwrap();
        assert!(reopened.find_component(component_id).unwrap().is_some());
    }

    #[test]
    fn test_create_project_requires_solution() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.create_project(Uuid::new_v4(), "p", "P"),
            Err(StoreError::NotFound { entity: "solution", .. })
        ));
    }

    #[test]
    fn test_delete_resource_file_cascades() {
        let (mut store, component, project) = seeded();
        let file = store.import(request(&component, &project, "test.json")).unwrap();
        assert!(store.delete_resource_file(file.id).unwrap());
        assert!(store.load_resource_file(file.id).unwrap().is_none());
        let translations: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM resource_translations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(translations, 0);
    }
}
