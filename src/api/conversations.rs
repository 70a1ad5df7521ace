//! Conversations endpoints

use crate::api::{ErrorBody, ExtractUser};
use crate::core::error::MessagingError;
use crate::core::traits::MessagingService;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_conversations).post(open_conversation))
        .route(
            "/:id/messages",
            get(conversation_messages).post(post_message),
        )
}

async fn list_conversations(
    Inject(messaging_service): Inject<dyn MessagingService>,
    ExtractUser(current_user): ExtractUser,
) -> Response {
    match messaging_service.list_conversations(current_user).await {
        Ok(conversations) => (
            StatusCode::OK,
            Json(schemas::ConversationList {
                conversations: conversations
                    .into_iter()
                    .map(schemas::Conversation::from)
                    .collect(),
            }),
        )
            .into_response(),
        Err(e) => messaging_error_response(e),
    }
}

/// Resolves the single conversation between the caller and a peer, creating
/// it on first contact.
async fn open_conversation(
    Inject(messaging_service): Inject<dyn MessagingService>,
    ExtractUser(current_user): ExtractUser,
    Json(request): Json<schemas::OpenConversation>,
) -> Response {
    match messaging_service
        .resolve_conversation(current_user, request.participant)
        .await
    {
        Ok(conversation) => (
            StatusCode::OK,
            Json(schemas::Conversation::from(conversation)),
        )
            .into_response(),
        Err(e) => messaging_error_response(e),
    }
}

async fn conversation_messages(
    Inject(messaging_service): Inject<dyn MessagingService>,
    ExtractUser(current_user): ExtractUser,
    Path(conversation_id): Path<Uuid>,
) -> Response {
    match messaging_service
        .list_messages(current_user, conversation_id)
        .await
    {
        Ok(messages) => (
            StatusCode::OK,
            Json(schemas::MessagesList {
                messages: messages.into_iter().map(schemas::Message::from).collect(),
            }),
        )
            .into_response(),
        Err(e) => messaging_error_response(e),
    }
}

async fn post_message(
    Inject(messaging_service): Inject<dyn MessagingService>,
    ExtractUser(current_user): ExtractUser,
    Path(conversation_id): Path<Uuid>,
    Json(request): Json<schemas::CreateMessage>,
) -> Response {
    match messaging_service
        .send_message(current_user, conversation_id, request.content)
        .await
    {
        Ok(message) => (StatusCode::CREATED, Json(schemas::Message::from(message))).into_response(),
        Err(e) => messaging_error_response(e),
    }
}

fn messaging_error_response(error: MessagingError) -> Response {
    let status = match &error {
        MessagingError::SelfConversation => StatusCode::UNPROCESSABLE_ENTITY,
        MessagingError::NotParticipant => StatusCode::NOT_FOUND,
        MessagingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ErrorBody::new(error))).into_response()
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    pub struct OpenConversation {
        pub participant: Uuid,
    }

    #[derive(Serialize, Debug)]
    pub struct Conversation {
        pub id: Uuid,
        pub participant_a: Uuid,
        pub participant_b: Uuid,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Conversation> for Conversation {
        fn from(conversation: entities::Conversation) -> Self {
            Conversation {
                id: conversation.id,
                participant_a: conversation.participant_a,
                participant_b: conversation.participant_b,
                created_at: conversation.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ConversationList {
        pub conversations: Vec<Conversation>,
    }

    #[derive(Serialize, Debug, Default)]
    pub struct MessagesList {
        pub messages: Vec<Message>,
    }

    #[derive(Serialize, Debug)]
    pub struct Message {
        pub id: Uuid,
        pub conversation_id: Uuid,
        pub sender: Uuid,
        pub content: String,
        pub read: bool,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Message> for Message {
        fn from(message: entities::Message) -> Self {
            Message {
                id: message.id,
                conversation_id: message.conversation_id,
                sender: message.sender,
                content: message.content,
                read: message.read,
                created_at: message.created_at,
            }
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct CreateMessage {
        pub content: String,
    }
}
