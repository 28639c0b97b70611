use crate::database::DB_NAME;
use crate::user::model::{UpdateUserRequest, User};
use crate::utils::error::ApiError;
use crate::utils::{hashing, validation};
use futures_util::TryStreamExt;
use mongodb::bson::{DateTime, doc, oid::ObjectId, to_bson};
use mongodb::{Client, Collection};
use std::collections::HashMap;

pub struct UserService {
    collection: Collection<User>,
}

impl UserService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<User>("users");
        UserService { collection }
    }

    pub async fn create_user(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<ObjectId, ApiError> {
        if username.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }

        validation::validate_email(&email)?;
        validation::validate_password(&password)?;

        if self.username_exists(&username).await? {
            return Err(ApiError::ConflictError(
                "Username already exists".to_string(),
            ));
        }

        if self.email_exists(&email).await? {
            return Err(ApiError::ConflictError("Email already exists".to_string()));
        }

        let hashed_password = hashing::hash_password(&password)
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        let new_user = User {
            id: None,
            username,
            email,
            password: hashed_password,
            role: Default::default(),
            bio: String::new(),
            avatar: String::new(),
            user_reports: Vec::new(),
            is_banned: false,
            created_at: DateTime::now(),
        };

        let result = self
            .collection
            .insert_one(new_user)
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            ApiError::InternalServerError("Failed to get inserted ID".to_string())
        })
    }

    async fn email_exists(&self, email: &str) -> Result<bool, ApiError> {
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;
        Ok(count > 0)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, ApiError> {
        let count = self
            .collection
            .count_documents(doc! { "username": username })
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;
        Ok(count > 0)
    }

    pub async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await
            .map_err(|_| ApiError::InternalServerError("Database error".to_string()))?
            .ok_or_else(|| ApiError::UnauthorizedError("Invalid credentials".to_string()))?;

        if !hashing::verify_password(password, &user.password)
            .map_err(|_| ApiError::InternalServerError("Invalid credentials".to_string()))?
        {
            return Err(ApiError::UnauthorizedError(
                "Invalid credentials".to_string(),
            ));
        }

        Ok(user)
    }

    pub async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, ApiError> {
        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))
    }

    pub async fn update_user(
        &self,
        id: &ObjectId,
        update: UpdateUserRequest,
    ) -> Result<User, ApiError> {
        let mut set = doc! {};

        if let Some(email) = update.email {
            validation::validate_email(&email)?;
            let in_use = self
                .collection
                .count_documents(doc! { "email": &email, "_id": { "$ne": id } })
                .await
                .map_err(|e| ApiError::InternalServerError(e.to_string()))?;
            if in_use > 0 {
                return Err(ApiError::ConflictError("Email already exists".to_string()));
            }
            set.insert("email", email);
        }

        if let Some(bio) = update.bio {
            set.insert("bio", bio);
        }

        if let Some(avatar) = update.avatar {
            set.insert("avatar", avatar);
        }

        if let Some(password) = update.password {
            validation::validate_password(&password)?;
            let hashed = hashing::hash_password(&password)
                .map_err(|e| ApiError::InternalServerError(e.to_string()))?;
            set.insert("password", hashed);
        }

        if set.is_empty() {
            return Err(ApiError::BadRequestError("Nothing to update".to_string()));
        }

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?
            .ok_or_else(|| ApiError::NotFoundError("User not found".to_string()))
    }

    pub async fn delete_user(&self, id: &ObjectId) -> Result<bool, ApiError> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        Ok(result.deleted_count > 0)
    }

    /// File a report against a user. Answers false when the reporter has
    /// already reported this user.
    pub async fn report_user(
        &self,
        target_id: &ObjectId,
        reporter: ObjectId,
        reason: String,
    ) -> Result<bool, ApiError> {
        let mut user = self
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| ApiError::NotFoundError("User not found".to_string()))?;

        if !user.register_report(reporter, reason) {
            return Ok(false);
        }

        let reports = to_bson(&user.user_reports)
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        self.collection
            .update_one(
                doc! { "_id": target_id },
                doc! { "$set": { "user_reports": reports } },
            )
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        Ok(true)
    }

    pub async fn set_banned(&self, id: &ObjectId, is_banned: bool) -> Result<(), ApiError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "is_banned": is_banned } },
            )
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(ApiError::NotFoundError("User not found".to_string()));
        }

        Ok(())
    }

    /// Resolve usernames for a set of user ids in one query
    pub async fn usernames_for(
        &self,
        ids: &[ObjectId],
    ) -> Result<HashMap<ObjectId, String>, ApiError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        let users: Vec<User> = cursor
            .try_collect()
            .await
            .map_err(|e| ApiError::InternalServerError(e.to_string()))?;

        Ok(users
            .into_iter()
            .filter_map(|u| u.id.map(|id| (id, u.username)))
            .collect())
    }
}
