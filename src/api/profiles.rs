// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 HouseHelp Network

//! Profile read endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::{
        HelperProfileRecord, HelperProfileRepository, OwnerProfileRecord, OwnerProfileRepository,
        StorageError,
    },
};

/// Get the authenticated user's owner profile.
#[utoipa::path(
    get,
    path = "/v1/profiles/me",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owner profile", body = OwnerProfileRecord),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No profile exists for this user")
    )
)]
pub async fn my_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<OwnerProfileRecord>, ApiError> {
    let storage = state.storage();
    let repo = OwnerProfileRepository::new(&storage);

    match repo.get(&user.user_id) {
        Ok(profile) => Ok(Json(profile)),
        Err(StorageError::NotFound(_)) => {
            Err(ApiError::not_found("No owner profile exists for this account"))
        }
        Err(error) => Err(ApiError::internal(format!(
            "Failed to load owner profile: {error}"
        ))),
    }
}

/// Get a helper profile by government id.
///
/// Visible to the owner who registered the helper and to admins.
#[utoipa::path(
    get,
    path = "/v1/helpers/{helper_id}",
    tag = "Profiles",
    params(
        ("helper_id" = String, Path, description = "Helper's government id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Helper profile", body = HelperProfileRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the registering owner"),
        (status = 404, description = "Helper not found")
    )
)]
pub async fn get_helper(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(helper_id): Path<String>,
) -> Result<Json<HelperProfileRecord>, ApiError> {
    let storage = state.storage();
    let repo = HelperProfileRepository::new(&storage);

    let profile = match repo.get(&helper_id) {
        Ok(profile) => profile,
        Err(StorageError::NotFound(_)) => {
            return Err(ApiError::not_found("Helper profile not found"));
        }
        Err(error) => {
            return Err(ApiError::internal(format!(
                "Failed to load helper profile: {error}"
            )));
        }
    };

    if profile.created_by != user.user_id && !user.is_admin() {
        return Err(ApiError::forbidden(
            "You can only view helpers that you have added",
        ));
    }

    Ok(Json(profile))
}
