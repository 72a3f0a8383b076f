//! Team and team membership repository for SQLite operations
//!
//! Membership roles are stored as a JSON array. Owner checks use
//! `json_each` so they run inside the same transaction as the write
//! they guard.

use sqlx::SqlitePool;

use super::{decode_list, decode_team_type, encode_list, placeholders};
use crate::core::constants::{TEAM_ROLE_MEMBER, TEAM_ROLE_OWNER};
use crate::data::sqlite::SqliteError;
use crate::data::types::{
    CreateTeamResult, LastOwnerResult, NewTeam, PageRequest, Paged, TeamMemberWithUser, TeamRow,
};

type TeamTuple = (String, String, i64, String, String, i64, i64);

const TEAM_COLUMNS: &str = "t.id, t.name, t.type, t.room_id, t.created_by, t.created_at, t.updated_at";

fn team_from_tuple(
    (id, name, team_type, room_id, created_by, created_at, updated_at): TeamTuple,
) -> Result<TeamRow, SqliteError> {
    Ok(TeamRow {
        id,
        name,
        team_type: decode_team_type(team_type)?,
        room_id,
        created_by,
        created_at,
        updated_at,
    })
}

type MemberTuple = (String, String, String, Option<String>, String, String, String, i64);

fn member_from_tuple(
    (team_id, user_id, username, name, status, roles, created_by, created_at): MemberTuple,
) -> Result<TeamMemberWithUser, SqliteError> {
    Ok(TeamMemberWithUser {
        team_id,
        user_id,
        username,
        name,
        status,
        roles: decode_list("team_members.roles", &roles)?,
        created_by,
        created_at,
    })
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

/// Create a team, its main room and its initial members in one transaction
pub async fn create_team(
    pool: &SqlitePool,
    input: &NewTeam<'_>,
) -> Result<CreateTeamResult, SqliteError> {
    let mut tx = pool.begin().await?;

    let existing = sqlx::query_as::<_, (String,)>("SELECT id FROM teams WHERE name = ?")
        .bind(input.name)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Ok(CreateTeamResult::NameTaken);
    }

    let mut wanted: Vec<String> = Vec::with_capacity(input.member_ids.len() + 1);
    wanted.push(input.owner_id.to_string());
    for id in input.member_ids {
        if !wanted.contains(id) {
            wanted.push(id.clone());
        }
    }

    let sql = format!(
        "SELECT id FROM users WHERE id IN ({})",
        placeholders(wanted.len())
    );
    let mut query = sqlx::query_as::<_, (String,)>(&sql);
    for id in &wanted {
        query = query.bind(id);
    }
    let found: Vec<String> = query
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|(id,)| id)
        .collect();
    let unknown: Vec<String> = wanted
        .iter()
        .filter(|id| !found.contains(id))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Ok(CreateTeamResult::UnknownUsers(unknown));
    }

    let team_id = cuid2::create_id();
    let room_id = cuid2::create_id();
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        "INSERT INTO rooms (id, name, type, team_id, team_main, read_only, created_at) VALUES (?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&room_id)
    .bind(input.name)
    .bind(input.team_type.main_room_type().as_str())
    .bind(&team_id)
    .bind(input.read_only)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let inserted = sqlx::query(
        "INSERT INTO teams (id, name, type, room_id, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&team_id)
    .bind(input.name)
    .bind(input.team_type.as_i64())
    .bind(&room_id)
    .bind(input.created_by)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await;

    match inserted {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => return Ok(CreateTeamResult::NameTaken),
        Err(e) => return Err(e.into()),
    }

    let owner_roles = encode_list(&[TEAM_ROLE_OWNER.to_string()]);
    let member_roles = encode_list(&[TEAM_ROLE_MEMBER.to_string()]);
    for user_id in &wanted {
        let roles = if user_id == input.owner_id {
            &owner_roles
        } else {
            &member_roles
        };
        sqlx::query(
            "INSERT INTO team_members (team_id, user_id, roles, created_by, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&team_id)
        .bind(user_id)
        .bind(roles)
        .bind(input.created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(CreateTeamResult::Created(TeamRow {
        id: team_id,
        name: input.name.to_string(),
        team_type: input.team_type,
        room_id,
        created_by: input.created_by.to_string(),
        created_at: now,
        updated_at: now,
    }))
}

pub async fn get_team(pool: &SqlitePool, id: &str) -> Result<Option<TeamRow>, SqliteError> {
    let sql = format!("SELECT {} FROM teams t WHERE t.id = ?", TEAM_COLUMNS);
    let row = sqlx::query_as::<_, TeamTuple>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(team_from_tuple).transpose()
}

pub async fn get_team_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<TeamRow>, SqliteError> {
    let sql = format!("SELECT {} FROM teams t WHERE t.name = ?", TEAM_COLUMNS);
    let row = sqlx::query_as::<_, TeamTuple>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    row.map(team_from_tuple).transpose()
}

/// Teams the user is a member of, ordered by name
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    page: PageRequest,
) -> Result<Paged<TeamRow>, SqliteError> {
    let sql = format!(
        r#"
        SELECT {}
        FROM teams t
        JOIN team_members tm ON tm.team_id = t.id
        WHERE tm.user_id = ?
        ORDER BY t.name, t.id
        LIMIT ? OFFSET ?
        "#,
        TEAM_COLUMNS
    );
    let rows = sqlx::query_as::<_, TeamTuple>(&sql)
        .bind(user_id)
        .bind(page.count)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;

    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM team_members WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(Paged {
        items: rows
            .into_iter()
            .map(team_from_tuple)
            .collect::<Result<_, _>>()?,
        total: total as u64,
    })
}

/// Every team, ordered by name
pub async fn list_all(pool: &SqlitePool, page: PageRequest) -> Result<Paged<TeamRow>, SqliteError> {
    let sql = format!(
        "SELECT {} FROM teams t ORDER BY t.name, t.id LIMIT ? OFFSET ?",
        TEAM_COLUMNS
    );
    let rows = sqlx::query_as::<_, TeamTuple>(&sql)
        .bind(page.count)
        .bind(page.offset)
        .fetch_all(pool)
        .await?;

    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams")
        .fetch_one(pool)
        .await?;

    Ok(Paged {
        items: rows
            .into_iter()
            .map(team_from_tuple)
            .collect::<Result<_, _>>()?,
        total: total as u64,
    })
}

/// Members of a team joined with their user rows, in join order
pub async fn list_members(
    pool: &SqlitePool,
    team_id: &str,
    page: PageRequest,
) -> Result<Paged<TeamMemberWithUser>, SqliteError> {
    let rows = sqlx::query_as::<_, MemberTuple>(
        r#"
        SELECT tm.team_id, tm.user_id, u.username, u.name, u.status, tm.roles, tm.created_by, tm.created_at
        FROM team_members tm
        JOIN users u ON u.id = tm.user_id
        WHERE tm.team_id = ?
        ORDER BY tm.created_at, u.username
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(team_id)
    .bind(page.count)
    .bind(page.offset)
    .fetch_all(pool)
    .await?;

    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM team_members WHERE team_id = ?")
        .bind(team_id)
        .fetch_one(pool)
        .await?;

    Ok(Paged {
        items: rows
            .into_iter()
            .map(member_from_tuple)
            .collect::<Result<_, _>>()?,
        total: total as u64,
    })
}

/// Roles of a user within a team, or `None` when not a member
pub async fn get_member_roles(
    pool: &SqlitePool,
    team_id: &str,
    user_id: &str,
) -> Result<Option<Vec<String>>, SqliteError> {
    let row = sqlx::query_as::<_, (String,)>(
        "SELECT roles FROM team_members WHERE team_id = ? AND user_id = ?",
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(|(roles,)| decode_list("team_members.roles", &roles))
        .transpose()
}

/// Add members; users already in the team are left untouched.
/// Returns the number of new memberships.
pub async fn add_members(
    pool: &SqlitePool,
    team_id: &str,
    members: &[(String, Vec<String>)],
    created_by: &str,
) -> Result<u64, SqliteError> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;
    let mut added = 0;

    for (user_id, roles) in members {
        let result = sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id, roles, created_by, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(team_id, user_id) DO NOTHING
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(encode_list(roles))
        .bind(created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        added += result.rows_affected();
    }

    tx.commit().await?;
    Ok(added)
}

async fn count_owners(
    tx: &mut sqlx::SqliteConnection,
    team_id: &str,
) -> Result<i64, SqliteError> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM team_members tm
        WHERE tm.team_id = ?
          AND EXISTS (SELECT 1 FROM json_each(tm.roles) WHERE json_each.value = ?)
        "#,
    )
    .bind(team_id)
    .bind(TEAM_ROLE_OWNER)
    .fetch_one(&mut *tx)
    .await?;
    Ok(count)
}

/// Replace a member's roles, refusing to demote the last owner
pub async fn update_member_roles(
    pool: &SqlitePool,
    team_id: &str,
    user_id: &str,
    roles: &[String],
) -> Result<LastOwnerResult<()>, SqliteError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, (String,)>(
        "SELECT roles FROM team_members WHERE team_id = ? AND user_id = ?",
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((current,)) = current else {
        return Ok(LastOwnerResult::NotFound);
    };
    let current = decode_list("team_members.roles", &current)?;

    let demotes_owner = current.iter().any(|r| r == TEAM_ROLE_OWNER)
        && !roles.iter().any(|r| r == TEAM_ROLE_OWNER);
    if demotes_owner && count_owners(&mut tx, team_id).await? == 1 {
        return Ok(LastOwnerResult::LastOwner);
    }

    sqlx::query("UPDATE team_members SET roles = ? WHERE team_id = ? AND user_id = ?")
        .bind(encode_list(roles))
        .bind(team_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(LastOwnerResult::Success(()))
}

/// Remove a member, refusing to remove the last owner
pub async fn remove_member(
    pool: &SqlitePool,
    team_id: &str,
    user_id: &str,
) -> Result<LastOwnerResult<()>, SqliteError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, (String,)>(
        "SELECT roles FROM team_members WHERE team_id = ? AND user_id = ?",
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((current,)) = current else {
        return Ok(LastOwnerResult::NotFound);
    };
    let current = decode_list("team_members.roles", &current)?;

    if current.iter().any(|r| r == TEAM_ROLE_OWNER) && count_owners(&mut tx, team_id).await? == 1
    {
        return Ok(LastOwnerResult::LastOwner);
    }

    sqlx::query("DELETE FROM team_members WHERE team_id = ? AND user_id = ?")
        .bind(team_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(LastOwnerResult::Success(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::repositories::{room, setup_test_pool, user};
    use crate::data::types::{RoomType, TeamType};

    const PAGE: PageRequest = PageRequest {
        offset: 0,
        count: 50,
    };

    async fn make_user(pool: &SqlitePool, username: &str) -> String {
        user::create_user(pool, username, None, &["user".to_string()])
            .await
            .unwrap()
            .unwrap()
            .id
    }

    async fn make_team(pool: &SqlitePool, name: &str, owner: &str, members: &[String]) -> TeamRow {
        let input = NewTeam {
            name,
            team_type: TeamType::Public,
            owner_id: owner,
            member_ids: members,
            created_by: owner,
            read_only: false,
        };
        match create_team(pool, &input).await.unwrap() {
            CreateTeamResult::Created(team) => team,
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_team_creates_main_room_and_members() {
        let pool = setup_test_pool().await;
        let owner = make_user(&pool, "owner").await;
        let member = make_user(&pool, "member").await;

        let team = make_team(&pool, "core", &owner, &[member.clone()]).await;

        let main_room = room::get_room(&pool, &team.room_id).await.unwrap().unwrap();
        assert_eq!(main_room.room_type, RoomType::Channel);
        assert!(main_room.team_main);
        assert_eq!(main_room.team_id.as_deref(), Some(team.id.as_str()));

        let owner_roles = get_member_roles(&pool, &team.id, &owner).await.unwrap();
        assert_eq!(owner_roles, Some(vec!["owner".to_string()]));
        let member_roles = get_member_roles(&pool, &team.id, &member).await.unwrap();
        assert_eq!(member_roles, Some(vec!["member".to_string()]));
    }

    #[tokio::test]
    async fn test_create_private_team_uses_private_room() {
        let pool = setup_test_pool().await;
        let owner = make_user(&pool, "owner").await;

        let input = NewTeam {
            name: "secret",
            team_type: TeamType::Private,
            owner_id: &owner,
            member_ids: &[],
            created_by: &owner,
            read_only: true,
        };
        let CreateTeamResult::Created(team) = create_team(&pool, &input).await.unwrap() else {
            panic!("team not created");
        };
        let main_room = room::get_room(&pool, &team.room_id).await.unwrap().unwrap();
        assert_eq!(main_room.room_type, RoomType::Private);
        assert!(main_room.read_only);
    }

    #[tokio::test]
    async fn test_create_team_duplicate_name() {
        let pool = setup_test_pool().await;
        let owner = make_user(&pool, "owner").await;
        make_team(&pool, "core", &owner, &[]).await;

        let input = NewTeam {
            name: "core",
            team_type: TeamType::Public,
            owner_id: &owner,
            member_ids: &[],
            created_by: &owner,
            read_only: false,
        };
        let result = create_team(&pool, &input).await.unwrap();
        assert!(matches!(result, CreateTeamResult::NameTaken));
    }

    #[tokio::test]
    async fn test_create_team_unknown_member_writes_nothing() {
        let pool = setup_test_pool().await;
        let owner = make_user(&pool, "owner").await;

        let input = NewTeam {
            name: "core",
            team_type: TeamType::Public,
            owner_id: &owner,
            member_ids: &["ghost".to_string()],
            created_by: &owner,
            read_only: false,
        };
        let result = create_team(&pool, &input).await.unwrap();
        match result {
            CreateTeamResult::UnknownUsers(ids) => assert_eq!(ids, vec!["ghost"]),
            other => panic!("unexpected result: {:?}", other),
        }

        let teams = list_all(&pool, PAGE).await.unwrap();
        assert_eq!(teams.total, 0);
        let (rooms,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(rooms, 0);
    }

    #[tokio::test]
    async fn test_list_for_user_and_all() {
        let pool = setup_test_pool().await;
        let alice = make_user(&pool, "alice").await;
        let bob = make_user(&pool, "bob").await;

        make_team(&pool, "zeta", &alice, &[]).await;
        make_team(&pool, "alpha", &alice, &[bob.clone()]).await;
        make_team(&pool, "beta", &bob, &[]).await;

        let mine = list_for_user(&pool, &alice, PAGE).await.unwrap();
        assert_eq!(mine.total, 2);
        let names: Vec<&str> = mine.items.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        let all = list_all(
            &pool,
            PageRequest {
                offset: 1,
                count: 1,
            },
        )
        .await
        .unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.items.len(), 1);
        assert_eq!(all.items[0].name, "beta");
    }

    #[tokio::test]
    async fn test_get_team_by_id_and_name() {
        let pool = setup_test_pool().await;
        let owner = make_user(&pool, "owner").await;
        let team = make_team(&pool, "core", &owner, &[]).await;

        assert_eq!(get_team(&pool, &team.id).await.unwrap().unwrap().name, "core");
        assert_eq!(
            get_team_by_name(&pool, "core").await.unwrap().unwrap().id,
            team.id
        );
        assert!(get_team_by_name(&pool, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_members_ignores_existing() {
        let pool = setup_test_pool().await;
        let owner = make_user(&pool, "owner").await;
        let carol = make_user(&pool, "carol").await;
        let team = make_team(&pool, "core", &owner, &[]).await;

        let members = vec![
            (owner.clone(), vec!["member".to_string()]),
            (carol.clone(), vec!["member".to_string()]),
        ];
        let added = add_members(&pool, &team.id, &members, &owner).await.unwrap();
        assert_eq!(added, 1);

        // Existing owner keeps the owner role
        let roles = get_member_roles(&pool, &team.id, &owner).await.unwrap();
        assert_eq!(roles, Some(vec!["owner".to_string()]));

        let listed = list_members(&pool, &team.id, PAGE).await.unwrap();
        assert_eq!(listed.total, 2);
        let mut usernames: Vec<&str> = listed.items.iter().map(|m| m.username.as_str()).collect();
        usernames.sort();
        assert_eq!(usernames, vec!["carol", "owner"]);
    }

    #[tokio::test]
    async fn test_remove_last_owner_is_refused() {
        let pool = setup_test_pool().await;
        let owner = make_user(&pool, "owner").await;
        let member = make_user(&pool, "member").await;
        let team = make_team(&pool, "core", &owner, &[member.clone()]).await;

        let result = remove_member(&pool, &team.id, &owner).await.unwrap();
        assert!(matches!(result, LastOwnerResult::LastOwner));

        let result = remove_member(&pool, &team.id, &member).await.unwrap();
        assert!(matches!(result, LastOwnerResult::Success(())));

        let result = remove_member(&pool, &team.id, &member).await.unwrap();
        assert!(matches!(result, LastOwnerResult::NotFound));
    }

    #[tokio::test]
    async fn test_update_member_roles_guards_last_owner() {
        let pool = setup_test_pool().await;
        let owner = make_user(&pool, "owner").await;
        let member = make_user(&pool, "member").await;
        let team = make_team(&pool, "core", &owner, &[member.clone()]).await;

        let demote = update_member_roles(&pool, &team.id, &owner, &["member".to_string()])
            .await
            .unwrap();
        assert!(matches!(demote, LastOwnerResult::LastOwner));

        let promote = update_member_roles(
            &pool,
            &team.id,
            &member,
            &["owner".to_string(), "member".to_string()],
        )
        .await
        .unwrap();
        assert!(matches!(promote, LastOwnerResult::Success(())));

        // With a second owner the first can step down
        let demote = update_member_roles(&pool, &team.id, &owner, &["member".to_string()])
            .await
            .unwrap();
        assert!(matches!(demote, LastOwnerResult::Success(())));
    }
}
