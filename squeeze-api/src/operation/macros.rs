//! Declarative macros for operation definitions
//!
//! Most commands follow one of a few shapes: a fixed token list whose reply
//! is ignored, or a token list whose reply maps onto a flat schema. These
//! macros generate the request struct, the response struct, the operation
//! type and its trait implementation, plus a snake_case constructor for the
//! request.

/// Define an operation whose reply carries nothing of interest
///
/// # Example
/// ```rust,ignore
/// define_command_operation! {
///     operation: PlayIndexOperation,
///     command: "playlist index",
///     scope: Player,
///     request: PlayIndexRequest { index: u32 },
///     tokens: |req| Command::from_tokens(["playlist", "index"]).arg(req.index),
/// }
/// ```
#[macro_export]
macro_rules! define_command_operation {
    (
        operation: $op_struct:ident,
        command: $command:literal,
        scope: $scope:ident,
        request: $request_struct:ident {
            $($field:ident: $field_type:ty),* $(,)?
        },
        tokens: |$req_param:ident| $tokens_expr:expr $(,)?
    ) => {
        paste::paste! {
            #[derive(Clone, Debug, PartialEq)]
            pub struct $request_struct {
                $(pub $field: $field_type,)*
            }

            pub struct $op_struct;

            impl $crate::operation::SqueezeOperation for $op_struct {
                type Request = $request_struct;
                type Response = ();

                const SCOPE: $crate::operation::Scope = $crate::operation::Scope::$scope;
                const COMMAND: &'static str = $command;

                fn build_command(
                    request: &Self::Request,
                ) -> Result<$crate::command::Command, $crate::operation::ValidationError> {
                    let $req_param = request;
                    Ok($tokens_expr)
                }

                fn parse_response(
                    _request: &Self::Request,
                    _result: &serde_json::Value,
                ) -> Result<Self::Response, $crate::error::ApiError> {
                    Ok(())
                }
            }

            pub fn [<$op_struct:snake>]($($field: $field_type),*) -> $request_struct {
                $request_struct { $($field,)* }
            }
        }
    };
}

/// Define an operation whose reply deserializes into a flat schema
///
/// Response fields accept serde attributes so that each field can name the
/// reply key it is read from.
///
/// # Example
/// ```rust,ignore
/// define_query_operation! {
///     operation: PlayerCountOperation,
///     command: "player count",
///     scope: Server,
///     request: PlayerCountRequest {},
///     tokens: |_req| Command::from_tokens(["player", "count"]).query(),
///     response: PlayerCountResponse {
///         #[serde(rename = "_count", default, deserialize_with = "crate::de::count")]
///         count: u32,
///     },
/// }
/// ```
#[macro_export]
macro_rules! define_query_operation {
    (
        operation: $op_struct:ident,
        command: $command:literal,
        scope: $scope:ident,
        request: $request_struct:ident {
            $($field:ident: $field_type:ty),* $(,)?
        },
        tokens: |$req_param:ident| $tokens_expr:expr,
        response: $response_struct:ident {
            $($(#[$resp_meta:meta])* $resp_field:ident: $resp_type:ty),* $(,)?
        } $(,)?
    ) => {
        paste::paste! {
            #[derive(Clone, Debug, PartialEq)]
            pub struct $request_struct {
                $(pub $field: $field_type,)*
            }

            #[derive(serde::Deserialize, serde::Serialize, Clone, Debug, Default, PartialEq)]
            pub struct $response_struct {
                $($(#[$resp_meta])* pub $resp_field: $resp_type,)*
            }

            pub struct $op_struct;

            impl $crate::operation::SqueezeOperation for $op_struct {
                type Request = $request_struct;
                type Response = $response_struct;

                const SCOPE: $crate::operation::Scope = $crate::operation::Scope::$scope;
                const COMMAND: &'static str = $command;

                fn build_command(
                    request: &Self::Request,
                ) -> Result<$crate::command::Command, $crate::operation::ValidationError> {
                    let $req_param = request;
                    Ok($tokens_expr)
                }

                fn parse_response(
                    _request: &Self::Request,
                    result: &serde_json::Value,
                ) -> Result<Self::Response, $crate::error::ApiError> {
                    $crate::operation::parse_schema(result)
                }
            }

            pub fn [<$op_struct:snake>]($($field: $field_type),*) -> $request_struct {
                $request_struct { $($field,)* }
            }
        }
    };
}
