use allerta_common::{caller::Role, validation::is_valid_email};
use allerta_db::{
    models::DbUser,
    password::{DEFAULT_COST, hash_password},
    storage::UserStore,
};
use anyhow::{Context, bail};
use clap::Parser;

#[derive(Clone, Parser)]
pub struct CreateUserParams {
    #[clap(short, long)]
    pub email: String,

    #[clap(short, long)]
    pub password: String,

    #[clap(short, long, default_value_t = Role::User)]
    pub role: Role,
}

pub async fn create_user(
    stg: &impl UserStore,
    CreateUserParams {
        email,
        password,
        role,
    }: CreateUserParams,
) -> anyhow::Result<()> {
    if !is_valid_email(&email) {
        bail!("Invalid email: {email}");
    }
    if password.is_empty() {
        bail!("Password must not be empty");
    }

    let hash = hash_password(&password, DEFAULT_COST).context("Failed to hash password")?;
    let new_user = UserStore::create(stg, DbUser::new(email, hash, role)).await?;

    println!("Created {} with ID {}", new_user.role, new_user.id);

    Ok(())
}
