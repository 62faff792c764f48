//! Protobuf messages of the `TodoService`.
//!
//! The field tags follow `todo.proto`. Messages also implement `serde` traits so front-ends can
//! read and print them as JSON.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, ::prost::Message, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message, Serialize, Deserialize)]
pub struct TodoId {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct Todo {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub title: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(bool, tag = "4")]
    pub completed: bool,
}

#[derive(Clone, PartialEq, ::prost::Message, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoList {
    #[prost(message, repeated, tag = "1")]
    pub todos: Vec<Todo>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_json_fields_default_like_protobuf() {
        let todo: Todo = serde_json::from_str(r#"{ "title": "Buy milk" }"#).unwrap();

        assert_eq!(
            todo,
            Todo {
                title: "Buy milk".to_string(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_list_serializes_as_json_array() {
        let list = TodoList {
            todos: vec![Todo {
                id: "1".to_string(),
                title: "Walk".to_string(),
                description: String::new(),
                completed: true,
            }],
        };

        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            serde_json::json!({
                "todos": [{ "id": "1", "title": "Walk", "description": "", "completed": true }]
            })
        );
    }
}
