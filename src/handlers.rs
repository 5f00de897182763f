// src/handlers.rs
use crate::auth::{hash_password, verify_password};
use crate::models::{
    CheckTodoSchema,
    CreateTodoSchema,
    LoginResponse,
    LoginSchema,
    RecurringCreatedResponse,
    RecurringTodoSchema,
    RegisterSchema,
    ReorderSchema,
    ReviewTodoSchema,
    Todo,
    TodoListQuery,
    UpdateTodoSchema,
    User,
};
use crate::recurring;
use crate::validation::ValidatedJson;
use crate::AppError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use validator::{ValidationError, ValidationErrors};

// --- 0. 公共查询 ---
// 所有 Todo 操作都先解析用户; Todo 本身必须同时按 id 和 user_id 查,
// 只按 id 查会把别人的数据漏出去

async fn find_user(db: &PgPool, user_id: i32) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

// sort_by 只认 created_at / updated_at, 其他值静默回退到 created_at
fn sort_key(sort_by: Option<&str>) -> &'static str {
    match sort_by {
        Some("updated_at") => "updated_at",
        _ => "created_at",
    }
}

// --- 1. 获取列表 (GET /users/:user_id/todos) ---
pub async fn get_todos_handler(
    Path(user_id): Path<i32>,
    Query(params): Query<TodoListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Todo>>, AppError> {
    let user = find_user(&state.db, user_id).await?;

    // month 和 day 必须同时给才过滤 (不看年份), 只给一个视为没给
    let date_filter = match (params.month.as_deref(), params.day.as_deref()) {
        (Some(m), Some(d)) => {
            let month: i32 = m.parse().map_err(|_| {
                AppError::BadRequest("month and day must be integers".to_string())
            })?;
            let day: i32 = d.parse().map_err(|_| {
                AppError::BadRequest("month and day must be integers".to_string())
            })?;
            Some((month, day))
        }
        _ => None,
    };

    let order_col = sort_key(params.sort_by.as_deref());

    let todos = if let Some((month, day)) = date_filter {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT * FROM todos WHERE user_id = $1 \
             AND EXTRACT(MONTH FROM date) = $2 AND EXTRACT(DAY FROM date) = $3 \
             ORDER BY {}",
            order_col
        ))
        .bind(user.id)
        .bind(month)
        .bind(day)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as::<_, Todo>(&format!(
            "SELECT * FROM todos WHERE user_id = $1 ORDER BY {}",
            order_col
        ))
        .bind(user.id)
        .fetch_all(&state.db)
        .await?
    };

    Ok(Json(todos))
}

// --- 2. 创建 Todo (POST /users/:user_id/todos) ---
pub async fn create_todo_handler(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateTodoSchema>,
) -> Result<Json<Todo>, AppError> {
    let user = find_user(&state.db, user_id).await?;

    // is_checked 走表默认值 false
    let todo = sqlx::query_as::<_, Todo>(
        "INSERT INTO todos (user_id, date, content) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(user.id)
    .bind(body.date)
    .bind(body.content)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(todo))
}

// --- 3. 更新日期/内容 (PATCH /users/:user_id/todos/:todo_id) ---
pub async fn update_todo_handler(
    Path((user_id, todo_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<UpdateTodoSchema>,
) -> Result<Json<Todo>, AppError> {
    let user = find_user(&state.db, user_id).await?;

    // 没传的字段用 COALESCE 保持原值
    let todo = sqlx::query_as::<_, Todo>(
        "UPDATE todos SET \
            date = COALESCE($1, date), \
            content = COALESCE($2, content), \
            updated_at = NOW() \
         WHERE id = $3 AND user_id = $4 \
         RETURNING *",
    )
    .bind(body.date)
    .bind(body.content)
    .bind(todo_id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))?;

    Ok(Json(todo))
}

// --- 4. 删除 Todo (DELETE /users/:user_id/todos/:todo_id) ---
pub async fn delete_todo_handler(
    Path((user_id, todo_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = find_user(&state.db, user_id).await?;

    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(todo_id)
        .bind(user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Todo not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT) // 204 No Content
}

// --- 5. 勾选/取消勾选 (PATCH /users/:user_id/todos/:todo_id/check) ---
pub async fn check_todo_handler(
    Path((user_id, todo_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CheckTodoSchema>,
) -> Result<Json<Todo>, AppError> {
    let user = find_user(&state.db, user_id).await?;

    // 没传 is_checked 和传了非布尔值是两种 400:
    // 后者在 Json 反序列化阶段就被拒了, 这里只处理缺字段
    let Some(is_checked) = body.is_checked else {
        return Err(AppError::BadRequest("is_checked is required".to_string()));
    };

    let todo = sqlx::query_as::<_, Todo>(
        "UPDATE todos SET is_checked = $1, updated_at = NOW() \
         WHERE id = $2 AND user_id = $3 \
         RETURNING *",
    )
    .bind(is_checked)
    .bind(todo_id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))?;

    Ok(Json(todo))
}

// --- 6. 回顾表情 (PATCH /users/:user_id/todos/:todo_id/review) ---
pub async fn review_todo_handler(
    Path((user_id, todo_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ReviewTodoSchema>,
) -> Result<Json<Todo>, AppError> {
    let user = find_user(&state.db, user_id).await?;

    let emoji = body
        .emoji
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("emoji is required".to_string()))?;

    let todo = sqlx::query_as::<_, Todo>(
        "UPDATE todos SET emoji = $1, updated_at = NOW() \
         WHERE id = $2 AND user_id = $3 \
         RETURNING *",
    )
    .bind(emoji)
    .bind(todo_id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Todo not found".to_string()))?;

    Ok(Json(todo))
}

// --- 7. 周期任务 (POST /users/:user_id/todos/recurring) ---
pub async fn create_recurring_todos_handler(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RecurringTodoSchema>,
) -> Result<(StatusCode, Json<RecurringCreatedResponse>), AppError> {
    let user = find_user(&state.db, user_id).await?;

    let target = recurring::parse_day_of_week(&body.day_of_week).ok_or_else(|| {
        AppError::BadRequest(format!("unknown day_of_week: {}", body.day_of_week))
    })?;
    let weeks = body.weeks.unwrap_or(4);

    // 周期任务就是普通 Todo: title 存进 content, 推算出的日期存进 date
    let mut ids = Vec::new();
    for next_date in recurring::occurrence_dates(body.start_date, target, weeks) {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO todos (user_id, date, content) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(user.id)
        .bind(next_date)
        .bind(&body.title)
        .fetch_one(&state.db)
        .await?;
        ids.push(id);
    }

    let count = ids.len();
    Ok((
        StatusCode::CREATED,
        Json(RecurringCreatedResponse {
            message: format!("{} recurring todos created", count),
            count,
            ids,
        }),
    ))
}

// --- 8. 拖拽排序 (PATCH /users/:user_id/todos/reorder) ---
pub async fn reorder_todos_handler(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<ReorderSchema>,
) -> Result<Json<serde_json::Value>, AppError> {
    let user = find_user(&state.db, user_id).await?;

    for (idx, todo_id) in body.order.iter().enumerate() {
        let result = sqlx::query(
            "UPDATE todos SET sort_order = $1, updated_at = NOW() \
             WHERE id = $2 AND user_id = $3",
        )
        .bind(idx as i32)
        .bind(todo_id)
        .bind(user.id)
        .execute(&state.db)
        .await?;

        // 逐条写入, 碰到无效 id 就停; 前面已写入的顺序保留, 不回滚
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Todo {} not found", todo_id)));
        }
    }

    Ok(Json(json!({"message": "Order updated successfully"})))
}

// --- 9. 用户注册 (POST /register) ---
pub async fn register_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RegisterSchema>,
) -> Result<Json<serde_json::Value>, AppError> {
    // 用户名唯一性也按字段级校验错误返回, 和长度规则一个口径
    let (taken,): (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&body.username)
            .fetch_one(&state.db)
            .await?;
    if taken {
        let mut errors = ValidationErrors::new();
        let mut error = ValidationError::new("unique");
        error.message = Some("用户名已存在".into());
        errors.add("username".into(), error);
        return Err(AppError::Validation(errors));
    }

    // 只存哈希, 不落明文
    let hashed_password = hash_password(&body.password).map_err(|_| AppError::Internal)?;

    sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
        .bind(&body.username)
        .bind(hashed_password)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({"message": "User registered successfully"})))
}

// --- 10. 用户登录 (POST /login) ---
pub async fn login_handler(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginSchema>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(&body.username)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // 密码不对也报 not-found, 不暴露用户名是否存在
    if !verify_password(&body.password, &user.password_hash) {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    // 登录只返回用户 id, 不发任何令牌
    Ok(Json(LoginResponse { user_id: user.id }))
}

#[cfg(test)]
mod tests {
    use super::sort_key;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(Some("created_at"), "created_at")]
    #[test_case(Some("updated_at"), "updated_at")]
    #[test_case(Some("due_date"), "created_at"; "unknown key falls back")]
    #[test_case(Some(""), "created_at"; "empty key falls back")]
    #[test_case(None, "created_at"; "absent key falls back")]
    fn sort_key_only_accepts_the_two_columns(input: Option<&str>, expected: &str) {
        assert_eq!(sort_key(input), expected);
    }
}
