// src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

// --- 1. Todo 模型 ---
// sort_order 是手动排序位; SQL 里 order 是关键字, 列名用 sort_order,
// 对外 JSON 仍然叫 "order"
#[derive(Debug, FromRow, Serialize)]
pub struct Todo {
    pub id: i32,
    pub user_id: i32,
    pub date: NaiveDate,
    pub content: String,
    pub is_checked: bool,
    pub emoji: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTodoSchema {
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "内容不能为空"))]
    pub content: String,
}

// 部分更新: 字段缺省就保持原值, 传了才应用
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTodoSchema {
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, message = "内容不能为空"))]
    pub content: Option<String>,
}

// is_checked 必须显式传 true/false, 用 Option 区分 "没传" 和 "传错类型"
// (类型不对会在 Json 反序列化阶段直接 400)
#[derive(Debug, Deserialize, Validate)]
pub struct CheckTodoSchema {
    pub is_checked: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewTodoSchema {
    pub emoji: Option<String>,
}

// --- 2. 周期任务模型 ---
#[derive(Debug, Deserialize, Validate)]
pub struct RecurringTodoSchema {
    #[validate(length(min = 1, message = "标题不能为空"))]
    pub title: String,
    pub day_of_week: String,
    pub start_date: NaiveDate,
    pub weeks: Option<i64>, // 默认 4 周
}

#[derive(Debug, Serialize)]
pub struct RecurringCreatedResponse {
    pub message: String,
    pub count: usize,
    pub ids: Vec<i32>,
}

// 拖拽排序: body 形如 {"order": [3, 1, 2]}
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderSchema {
    pub order: Vec<i32>,
}

// --- 3. 认证与查询模型 ---
#[derive(Debug, FromRow, Serialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterSchema {
    #[validate(length(min = 1, max = 150, message = "用户名不能为空且不超过 150 位"))]
    pub username: String,
    #[validate(length(min = 1, message = "密码不能为空"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginSchema {
    #[validate(length(min = 1, message = "用户名不能为空"))]
    pub username: String,
    #[validate(length(min = 1, message = "密码不能为空"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i32,
}

// month/day 先收字符串再手动转整数, 非整数要报 400 而不是丢给框架
#[derive(Debug, Deserialize)]
pub struct TodoListQuery {
    pub month: Option<String>,
    pub day: Option<String>,
    pub sort_by: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn todo_serializes_sort_order_as_order() {
        let todo = Todo {
            id: 1,
            user_id: 7,
            date: NaiveDate::from_ymd_opt(2025, 7, 2).unwrap(),
            content: "买菜".into(),
            is_checked: false,
            emoji: None,
            sort_order: 3,
            created_at: None,
            updated_at: None,
        };

        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["order"], 3);
        assert!(json.get("sort_order").is_none());
        assert_eq!(json["is_checked"], false);
    }

    #[test]
    fn user_never_serializes_password_hash() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password_hash: "$argon2id$...".into(),
            created_at: None,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn check_schema_distinguishes_missing_from_present() {
        let missing: CheckTodoSchema = serde_json::from_str("{}").unwrap();
        assert!(missing.is_checked.is_none());

        let present: CheckTodoSchema =
            serde_json::from_str(r#"{"is_checked": true}"#).unwrap();
        assert_eq!(present.is_checked, Some(true));

        // 字符串 "true" 不是布尔值, 反序列化必须失败
        assert!(serde_json::from_str::<CheckTodoSchema>(r#"{"is_checked": "true"}"#).is_err());
    }

    #[test]
    fn reorder_schema_rejects_non_list() {
        assert!(serde_json::from_str::<ReorderSchema>(r#"{"order": 3}"#).is_err());
        let ok: ReorderSchema = serde_json::from_str(r#"{"order": [3, 1, 2]}"#).unwrap();
        assert_eq!(ok.order, vec![3, 1, 2]);
    }

    #[test]
    fn update_schema_fields_are_optional() {
        let empty: UpdateTodoSchema = serde_json::from_str("{}").unwrap();
        assert!(empty.date.is_none());
        assert!(empty.content.is_none());
    }
}
