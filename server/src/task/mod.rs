use crate::entities::*;
use chrono::Utc;
use sea_orm::*;
use std::sync::Arc;

pub mod api;

/// A unit of work owned by one identity, open or concluded.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: i32,
    descricao: String,
    id_categoria: i32,
    data_conclusao: Option<chrono::DateTime<Utc>>,
    usuario: String,
}

/// Lifecycle state of a task, derived from its conclusion timestamp.
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum TaskStatus {
    Open,
    Concluded,
}

impl Task {
    pub fn new(
        id: i32,
        descricao: String,
        id_categoria: i32,
        data_conclusao: Option<chrono::DateTime<Utc>>,
        usuario: String,
    ) -> Self {
        Self {
            id,
            descricao,
            id_categoria,
            data_conclusao,
            usuario,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the description of the task.
    pub fn descricao(&self) -> &str {
        &self.descricao
    }

    /// Returns the category reference of the task.
    pub fn id_categoria(&self) -> i32 {
        self.id_categoria
    }

    /// Returns the conclusion timestamp, if the task has been concluded.
    pub fn data_conclusao(&self) -> Option<chrono::DateTime<Utc>> {
        self.data_conclusao
    }

    /// Returns the owner of the task.
    pub fn usuario(&self) -> &str {
        &self.usuario
    }

    /// Returns the lifecycle state of the task.
    pub fn status(&self) -> TaskStatus {
        match self.data_conclusao {
            Some(_) => TaskStatus::Concluded,
            None => TaskStatus::Open,
        }
    }
}

impl From<tarefa::Model> for Task {
    fn from(model: tarefa::Model) -> Self {
        Task::new(
            model.id,
            model.descricao,
            model.id_categoria,
            model.data_conclusao,
            model.usuario,
        )
    }
}

/// Fields required to create a task.
#[derive(Debug, Clone)]
pub struct TaskData {
    pub descricao: String,
    pub id_categoria: i32,
}

/// Partial update of a task; only supplied fields are applied.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub descricao: Option<String>,
    pub id_categoria: Option<i32>,
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a malformed or missing input field.
    #[error("Invalid task data: {0}")]
    Validation(String),
    /// Represents a task that is absent or owned by a different identity.
    /// The two cases are deliberately indistinguishable so callers cannot
    /// probe for the existence of other users' tasks.
    #[error("Task with ID {0} not found")]
    TaskNotFound(i32),
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Shared state for task routers.
#[derive(Clone)]
pub struct TaskState {
    pub db: Arc<DatabaseConnection>,
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService {
        TaskService { db }
    }

    /// Creates a new task owned by `owner`, initially open.
    ///
    /// # Arguments
    ///
    /// * `owner` - The identity the task belongs to.
    /// * `data` - The description and category reference of the task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the newly assigned task ID if successful, or an
    /// error otherwise. Fails with `Validation` if the description is empty
    /// or the category reference is unknown.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, owner: &str, data: TaskData) -> Result<i32, TaskServiceError> {
        self.validate_descricao(&data.descricao)?;
        self.validate_categoria(data.id_categoria).await?;

        let active_model = tarefa::ActiveModel {
            descricao: ActiveValue::Set(data.descricao),
            id_categoria: ActiveValue::Set(data.id_categoria),
            data_conclusao: ActiveValue::Set(None),
            usuario: ActiveValue::Set(owner.to_string()),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        Ok(created_model.id)
    }

    /// Retrieves all tasks owned by `owner`, oldest first.
    ///
    /// When `term` is given, only tasks whose description contains the term
    /// are returned. The match is a case-sensitive substring match
    /// (SQL `LIKE '%term%'`).
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(
        &self,
        owner: &str,
        term: Option<&str>,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let mut query = tarefa::Entity::find().filter(tarefa::Column::Usuario.eq(owner));
        if let Some(term) = term {
            query = query.filter(tarefa::Column::Descricao.contains(term));
        }
        let tasks = query
            .order_by_asc(tarefa::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID, scoped to `owner`.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task` if successful, or `TaskNotFound` if
    /// no such task exists or it belongs to a different identity.
    #[tracing::instrument(skip(self))]
    pub async fn get_task(&self, owner: &str, id: i32) -> Result<Task, TaskServiceError> {
        let model = self.find_owned_task(owner, id).await?;
        Ok(Task::from(model))
    }

    /// Applies a partial update to a task owned by `owner`.
    ///
    /// Only the supplied fields are changed; the owner, ID and conclusion
    /// timestamp are never touched by this operation.
    #[tracing::instrument(skip(self))]
    pub async fn update_task(
        &self,
        owner: &str,
        id: i32,
        patch: TaskPatch,
    ) -> Result<(), TaskServiceError> {
        if let Some(descricao) = &patch.descricao {
            self.validate_descricao(descricao)?;
        }
        if let Some(id_categoria) = patch.id_categoria {
            self.validate_categoria(id_categoria).await?;
        }

        let task_to_update = self.find_owned_task(owner, id).await?;

        let mut active_model: tarefa::ActiveModel = task_to_update.into();
        if let Some(descricao) = patch.descricao {
            active_model.descricao = ActiveValue::Set(descricao);
        }
        if let Some(id_categoria) = patch.id_categoria {
            active_model.id_categoria = ActiveValue::Set(id_categoria);
        }
        active_model.update(self.db).await?;
        Ok(())
    }

    /// Concludes a task, stamping it with the current time.
    ///
    /// Concluding an already concluded task is a no-op: the original
    /// conclusion timestamp is kept.
    #[tracing::instrument(skip(self))]
    pub async fn conclude_task(&self, owner: &str, id: i32) -> Result<(), TaskServiceError> {
        let task = self.find_owned_task(owner, id).await?;
        if task.data_conclusao.is_some() {
            return Ok(());
        }

        let mut active_model: tarefa::ActiveModel = task.into();
        active_model.data_conclusao = ActiveValue::Set(Some(Utc::now()));
        active_model.update(self.db).await?;
        Ok(())
    }

    /// Reopens a concluded task, clearing its conclusion timestamp.
    ///
    /// Reopening a task that is already open is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn reopen_task(&self, owner: &str, id: i32) -> Result<(), TaskServiceError> {
        let task = self.find_owned_task(owner, id).await?;
        if task.data_conclusao.is_none() {
            return Ok(());
        }

        let mut active_model: tarefa::ActiveModel = task.into();
        active_model.data_conclusao = ActiveValue::Set(None);
        active_model.update(self.db).await?;
        Ok(())
    }

    /// Deletes a task owned by `owner`.
    ///
    /// # Returns
    ///
    /// A `Result` that is `Ok` if the task was removed, or `TaskNotFound`
    /// under the same ownership rule as `get_task`.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task(&self, owner: &str, id: i32) -> Result<(), TaskServiceError> {
        let task_to_delete = self.find_owned_task(owner, id).await?;
        tarefa::Entity::delete_by_id(task_to_delete.id)
            .exec(self.db)
            .await?;
        Ok(())
    }

    /// Looks up a task by ID with the owner as part of the query predicate,
    /// so a foreign task and a missing task are the same `TaskNotFound`.
    async fn find_owned_task(
        &self,
        owner: &str,
        id: i32,
    ) -> Result<tarefa::Model, TaskServiceError> {
        tarefa::Entity::find_by_id(id)
            .filter(tarefa::Column::Usuario.eq(owner))
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }

    fn validate_descricao(&self, descricao: &str) -> Result<(), TaskServiceError> {
        if descricao.trim().is_empty() {
            return Err(TaskServiceError::Validation(
                "descricao must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    async fn validate_categoria(&self, id_categoria: i32) -> Result<(), TaskServiceError> {
        let exists = categoria::Entity::find_by_id(id_categoria)
            .one(self.db)
            .await?
            .is_some();
        if !exists {
            return Err(TaskServiceError::Validation(format!(
                "id_categoria {} does not reference a known category",
                id_categoria
            )));
        }
        Ok(())
    }
}
