use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, FieldErrors, Requester, ResultEngine, Role, User, auth_tokens, customers,
    employees, owners, users,
    util::{
        generate_token_key, hash_password, optional_text, validate_email, validate_password,
        validate_phone, verify_password, verify_unknown_user,
    },
};

use super::{Engine, merged, required, with_tx};

const USERNAME_MAX_LEN: usize = 150;
const ADDRESS_MAX_LEN: usize = 255;

/// Account fields accepted by registration and by `/user-detail` updates.
///
/// `password` and `designation` are only read on creation.
#[derive(Clone, Debug, Default)]
pub struct UserInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_type: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub designation: Option<String>,
}

fn validate_username(username: &str, errors: &mut FieldErrors) -> String {
    let username = username.trim();
    if username.is_empty() {
        errors.push("username", "This field may not be blank.");
    } else if username.chars().count() > USERNAME_MAX_LEN {
        errors.push(
            "username",
            format!("Ensure this field has no more than {USERNAME_MAX_LEN} characters."),
        );
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.push(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    username.to_string()
}

fn validate_address(address: &str, errors: &mut FieldErrors) -> String {
    crate::util::required_text(address, "address", ADDRESS_MAX_LEN, errors)
}

fn validate_name_part(value: Option<&str>, field: &str, errors: &mut FieldErrors) -> String {
    let value = value.map(str::trim).unwrap_or_default();
    if value.chars().count() > USERNAME_MAX_LEN {
        errors.push(
            field,
            format!("Ensure this field has no more than {USERNAME_MAX_LEN} characters."),
        );
    }
    value.to_string()
}

fn validated_email(value: Option<&str>, errors: &mut FieldErrors) -> Option<String> {
    let email = optional_text(value);
    if let Some(email) = &email {
        validate_email(email, "email", errors);
    }
    email
}

impl Engine {
    /// Public sign-up: creates a regular (non staff) account.
    pub async fn register(&self, input: UserInput) -> ResultEngine<User> {
        self.create_user(input, false).await
    }

    /// Create a user together with the profile row matching its role.
    ///
    /// Every invalid field is reported at once. Superusers are also flagged
    /// as staff.
    pub async fn create_user(&self, input: UserInput, is_superuser: bool) -> ResultEngine<User> {
        let mut errors = FieldErrors::new();

        let username = required(input.username.as_deref(), "username", &mut errors)
            .map(|username| validate_username(username, &mut errors));
        let password = required(input.password.as_deref(), "password", &mut errors);
        if let Some(password) = password {
            validate_password(password, &mut errors);
        }
        let role = match required(input.user_type.as_deref(), "user_type", &mut errors) {
            Some(user_type) => match Role::try_from(user_type) {
                Ok(role) => Some(role),
                Err(EngineError::Validation(field_errors)) => {
                    for message in field_errors.into_inner().into_values().flatten() {
                        errors.push("user_type", message);
                    }
                    None
                }
                Err(err) => return Err(err),
            },
            None => None,
        };
        let phone_number = required(input.phone_number.as_deref(), "phone_number", &mut errors)
            .map(|phone| {
                let phone = phone.trim();
                validate_phone(phone, "phone_number", &mut errors);
                phone.to_string()
            });
        let address = required(input.address.as_deref(), "address", &mut errors)
            .map(|address| validate_address(address, &mut errors));
        let email = validated_email(input.email.as_deref(), &mut errors);
        let first_name =
            validate_name_part(input.first_name.as_deref(), "first_name", &mut errors);
        let last_name = validate_name_part(input.last_name.as_deref(), "last_name", &mut errors);

        with_tx!(self, |db_tx| {
            if let Some(username) = &username
                && self.username_taken(&db_tx, username, None).await?
            {
                errors.push("username", "A user with that username already exists.");
            }
            errors.into_result()?;

            let (Some(username), Some(password), Some(role), Some(phone_number), Some(address)) =
                (username, password, role, phone_number, address)
            else {
                return Err(EngineError::invalid("user", "Incomplete user data."));
            };

            let password =
                hash_password(password).map_err(|err| EngineError::Hashing(err.to_string()))?;
            let user = users::ActiveModel {
                username: ActiveValue::Set(username),
                password: ActiveValue::Set(password),
                user_type: ActiveValue::Set(role.as_str().to_string()),
                email: ActiveValue::Set(email),
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                phone_number: ActiveValue::Set(phone_number),
                address: ActiveValue::Set(address),
                is_active: ActiveValue::Set(true),
                is_staff: ActiveValue::Set(is_superuser),
                is_superuser: ActiveValue::Set(is_superuser),
                date_joined: ActiveValue::Set(Utc::now()),
                last_login: ActiveValue::Set(None),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            self.create_profile(&db_tx, &user, role, input.designation.as_deref())
                .await?;
            Ok(user)
        })
    }

    async fn create_profile(
        &self,
        db_tx: &DatabaseTransaction,
        user: &users::Model,
        role: Role,
        designation: Option<&str>,
    ) -> ResultEngine<()> {
        match role {
            Role::Owner => {
                owners::ActiveModel {
                    user_id: ActiveValue::Set(user.id),
                }
                .insert(db_tx)
                .await?;
            }
            Role::Employee => {
                employees::ActiveModel {
                    user_id: ActiveValue::Set(user.id),
                    designation: ActiveValue::Set(
                        designation.map(str::trim).unwrap_or_default().to_string(),
                    ),
                    restaurant_id: ActiveValue::Set(None),
                }
                .insert(db_tx)
                .await?;
            }
            Role::Customer => {
                customers::ActiveModel {
                    user_id: ActiveValue::Set(user.id),
                }
                .insert(db_tx)
                .await?;
            }
        }
        Ok(())
    }

    async fn username_taken(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
        exclude: Option<i32>,
    ) -> ResultEngine<bool> {
        let mut query = users::Entity::find().filter(users::Column::Username.eq(username));
        if let Some(id) = exclude {
            query = query.filter(users::Column::Id.ne(id));
        }
        Ok(query.one(db_tx).await?.is_some())
    }

    /// Check credentials and return the user's token, creating it on first
    /// login. Records the login time.
    pub async fn login(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> ResultEngine<String> {
        let (Some(username), Some(password)) = (
            username.filter(|u| !u.is_empty()),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(EngineError::invalid(
                "non_field_errors",
                "Must include \"username\" and \"password\".",
            ));
        };

        with_tx!(self, |db_tx| {
            let found = users::Entity::find()
                .filter(users::Column::Username.eq(username))
                .one(&db_tx)
                .await?;
            let Some(user) = found else {
                verify_unknown_user(password);
                return Err(EngineError::InvalidCredentials);
            };
            if !verify_password(password, &user.password) {
                return Err(EngineError::InvalidCredentials);
            }
            if !user.is_active {
                return Err(EngineError::InactiveUser);
            }

            let key = match auth_tokens::Entity::find()
                .filter(auth_tokens::Column::UserId.eq(user.id))
                .one(&db_tx)
                .await?
            {
                Some(token) => token.key,
                None => {
                    let token = auth_tokens::ActiveModel {
                        key: ActiveValue::Set(generate_token_key()),
                        user_id: ActiveValue::Set(user.id),
                        created_at: ActiveValue::Set(Utc::now()),
                    }
                    .insert(&db_tx)
                    .await?;
                    token.key
                }
            };

            users::ActiveModel {
                id: ActiveValue::Set(user.id),
                last_login: ActiveValue::Set(Some(Utc::now())),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Ok(key)
        })
    }

    /// Delete the requester's token. A token that is already gone is not an
    /// error.
    pub async fn logout(&self, requester: &Requester) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            auth_tokens::Entity::delete_many()
                .filter(auth_tokens::Column::UserId.eq(requester.id()))
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Resolve a token key to its active user.
    pub async fn authenticate(&self, key: &str) -> ResultEngine<Requester> {
        with_tx!(self, |db_tx| {
            let (_, user) = auth_tokens::Entity::find_by_id(key.to_string())
                .find_also_related(users::Entity)
                .one(&db_tx)
                .await?
                .ok_or(EngineError::Unauthenticated)?;
            let user = user
                .filter(|user| user.is_active)
                .ok_or(EngineError::Unauthenticated)?;
            self.requester_for(&db_tx, user).await
        })
    }

    /// Update the requester's own account. `user_type` may be repeated but
    /// never changed.
    pub async fn update_user(
        &self,
        requester: &Requester,
        input: UserInput,
        mode: super::UpdateMode,
    ) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let current = self.load_user(&db_tx, requester.id()).await?;
            let mut errors = FieldErrors::new();

            let username = merged(
                input
                    .username
                    .as_deref()
                    .map(|username| validate_username(username, &mut errors)),
                current.username.clone(),
                mode,
                "username",
                &mut errors,
            );
            if username != current.username
                && self
                    .username_taken(&db_tx, &username, Some(current.id))
                    .await?
            {
                errors.push("username", "A user with that username already exists.");
            }

            let user_type = merged(
                input.user_type.clone(),
                current.user_type.clone(),
                mode,
                "user_type",
                &mut errors,
            );
            if user_type != current.user_type {
                errors.push("user_type", "The account type cannot be changed.");
            }

            let phone_number = merged(
                input.phone_number.as_deref().map(|phone| {
                    let phone = phone.trim();
                    validate_phone(phone, "phone_number", &mut errors);
                    phone.to_string()
                }),
                current.phone_number.clone(),
                mode,
                "phone_number",
                &mut errors,
            );
            let address = merged(
                input
                    .address
                    .as_deref()
                    .map(|address| validate_address(address, &mut errors)),
                current.address.clone(),
                mode,
                "address",
                &mut errors,
            );

            let mut user: users::ActiveModel = current.clone().into();
            user.username = ActiveValue::Set(username);
            user.phone_number = ActiveValue::Set(phone_number);
            user.address = ActiveValue::Set(address);
            if input.email.is_some() {
                user.email = ActiveValue::Set(validated_email(input.email.as_deref(), &mut errors));
            }
            if input.first_name.is_some() {
                user.first_name = ActiveValue::Set(validate_name_part(
                    input.first_name.as_deref(),
                    "first_name",
                    &mut errors,
                ));
            }
            if input.last_name.is_some() {
                user.last_name = ActiveValue::Set(validate_name_part(
                    input.last_name.as_deref(),
                    "last_name",
                    &mut errors,
                ));
            }
            errors.into_result()?;

            Ok(user.update(&db_tx).await?)
        })
    }

    /// All users holding `role`, oldest first.
    pub async fn users_by_role(&self, role: Role) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            Ok(users::Entity::find()
                .filter(users::Column::UserType.eq(role.as_str()))
                .order_by_asc(users::Column::Id)
                .all(&db_tx)
                .await?)
        })
    }

    /// Enable or disable an account. Disabled accounts cannot log in and their
    /// tokens stop authenticating.
    pub async fn set_user_active(&self, user_id: i32, is_active: bool) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let user = self.load_user(&db_tx, user_id).await?;
            let mut user: users::ActiveModel = user.into();
            user.is_active = ActiveValue::Set(is_active);
            Ok(user.update(&db_tx).await?)
        })
    }
}
