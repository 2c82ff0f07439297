use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug)]
pub enum AppError {
    Unexpected,
    Unauthorized,
    InteractionBlocked,

    UsersNotFound,

    ChannelsNotFound,
    ChannelsNotMember,
    ChannelsInvalidTarget,

    MessagesEmpty,
    MessagesInvalidLength,
    MessagesTooManyAttachments,
    MessagesInvalidAttachments,
    MessagesRateLimited,

    NotificationsInvalidSubscription,
    NotificationsEndpointNotFound,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::Unauthorized => "unauthorized",
            AppError::InteractionBlocked => "interaction_blocked",

            AppError::UsersNotFound => "users.not_found",

            AppError::ChannelsNotFound => "channels.not_found",
            AppError::ChannelsNotMember => "channels.not_member",
            AppError::ChannelsInvalidTarget => "channels.invalid_target",

            AppError::MessagesEmpty => "messages.empty",
            AppError::MessagesInvalidLength => "messages.invalid_length",
            AppError::MessagesTooManyAttachments => "messages.too_many_attachments",
            AppError::MessagesInvalidAttachments => "messages.invalid_attachments",
            AppError::MessagesRateLimited => "messages.rate_limited",

            AppError::NotificationsInvalidSubscription => "notifications.invalid_subscription",
            AppError::NotificationsEndpointNotFound => "notifications.endpoint_not_found",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::Unauthorized => "You are not authorized to perform this action.",
            AppError::InteractionBlocked => {
                "You do not have permission to interact with this user."
            }

            AppError::UsersNotFound => "This user does not exist.",

            AppError::ChannelsNotFound => "Channel not found",
            AppError::ChannelsNotMember => "You are not a member of this channel.",
            AppError::ChannelsInvalidTarget => "You cannot open a conversation with this user.",

            AppError::MessagesEmpty => "A message needs text or at least one attachment.",
            AppError::MessagesInvalidLength => {
                "Your message was too short/long. It has not been sent."
            }
            AppError::MessagesTooManyAttachments => "A message can carry at most 10 attachments.",
            AppError::MessagesInvalidAttachments => {
                "One or more attachments are not available to attach."
            }
            AppError::MessagesRateLimited => {
                "You have sent too many messages in a short period of time."
            }

            AppError::NotificationsInvalidSubscription => {
                "The push subscription payload is malformed."
            }
            AppError::NotificationsEndpointNotFound => "This push endpoint is not registered.",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::ChannelsInvalidTarget
            | AppError::MessagesEmpty
            | AppError::MessagesInvalidLength
            | AppError::MessagesTooManyAttachments
            | AppError::MessagesInvalidAttachments
            | AppError::NotificationsInvalidSubscription => StatusCode::BAD_REQUEST,

            AppError::Unauthorized => StatusCode::UNAUTHORIZED,

            AppError::InteractionBlocked | AppError::ChannelsNotMember => StatusCode::FORBIDDEN,

            AppError::UsersNotFound
            | AppError::ChannelsNotFound
            | AppError::NotificationsEndpointNotFound => StatusCode::NOT_FOUND,

            AppError::MessagesRateLimited => StatusCode::TOO_MANY_REQUESTS,

            AppError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_errors_are_bad_requests() {
        assert_eq!(
            AppError::MessagesInvalidAttachments.http_status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MessagesTooManyAttachments.http_status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            AppError::MessagesInvalidAttachments.code(),
            "messages.invalid_attachments"
        );
        assert_eq!(
            AppError::MessagesTooManyAttachments.code(),
            "messages.too_many_attachments"
        );
        assert_eq!(AppError::MessagesRateLimited.code(), "messages.rate_limited");
    }

    #[test]
    fn rate_limit_maps_to_429() {
        assert_eq!(
            AppError::MessagesRateLimited.http_status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
