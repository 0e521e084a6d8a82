//! Authorization-mode selection.
//!
//! The transport asks a strategy which signing modes to try, in order, for a
//! model operation. An empty answer is not an error: it means the schema
//! expresses no requirement and the caller picks its own default.

use appsync_core::{AuthRule, AuthStrategy, AuthorizationType, ModelOperation, ModelSchema};
use tracing::trace;

/// Chooses the ordered authorization types for a model operation.
pub trait AuthModeStrategy: Send + Sync {
    fn auth_types_for(
        &self,
        schema: &ModelSchema,
        operation: ModelOperation,
    ) -> Vec<AuthorizationType>;
}

/// Always answers with one configured type, ignoring the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAuthModeStrategy {
    authorization_type: AuthorizationType,
}

impl DefaultAuthModeStrategy {
    pub fn new(authorization_type: AuthorizationType) -> Self {
        Self { authorization_type }
    }
}

impl AuthModeStrategy for DefaultAuthModeStrategy {
    fn auth_types_for(
        &self,
        _schema: &ModelSchema,
        _operation: ModelOperation,
    ) -> Vec<AuthorizationType> {
        vec![self.authorization_type]
    }
}

/// Derives the authorization types from the schema's auth rules.
///
/// Rules that cover the operation are taken in declaration order and mapped
/// to a type; duplicates keep their first position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MultiAuthModeStrategy;

static INSTANCE: MultiAuthModeStrategy = MultiAuthModeStrategy;

impl MultiAuthModeStrategy {
    /// Shared accessor. The strategy holds no state.
    pub fn instance() -> &'static MultiAuthModeStrategy {
        &INSTANCE
    }

    /// Authorization types for an operation on the whole model.
    pub fn auth_types_for(
        &self,
        schema: &ModelSchema,
        operation: ModelOperation,
    ) -> Vec<AuthorizationType> {
        resolve(schema.name(), schema.auth_rules(), operation)
    }

    /// Authorization types for reading or writing a single field.
    ///
    /// A field that declares its own rules uses them instead of the model rules.
    pub fn auth_types_for_field(
        &self,
        schema: &ModelSchema,
        field_name: &str,
        operation: ModelOperation,
    ) -> Vec<AuthorizationType> {
        match schema.field(field_name) {
            Some(field) if !field.auth_rules.is_empty() => {
                resolve(schema.name(), &field.auth_rules, operation)
            }
            _ => resolve(schema.name(), schema.auth_rules(), operation),
        }
    }
}

impl AuthModeStrategy for MultiAuthModeStrategy {
    fn auth_types_for(
        &self,
        schema: &ModelSchema,
        operation: ModelOperation,
    ) -> Vec<AuthorizationType> {
        resolve(schema.name(), schema.auth_rules(), operation)
    }
}

/// Type a single rule asks for: the explicit provider when one is declared,
/// otherwise user pools for OWNER, GROUPS and PRIVATE and an API key for PUBLIC.
pub fn rule_authorization_type(rule: &AuthRule) -> AuthorizationType {
    if let Some(provider) = rule.provider {
        return provider.authorization_type();
    }
    match rule.strategy {
        AuthStrategy::Owner | AuthStrategy::Groups | AuthStrategy::Private => {
            AuthorizationType::AmazonCognitoUserPools
        }
        AuthStrategy::Public => AuthorizationType::ApiKey,
    }
}

fn resolve(
    type_name: &str,
    rules: &[AuthRule],
    operation: ModelOperation,
) -> Vec<AuthorizationType> {
    let mut types = Vec::new();
    for rule in rules.iter().filter(|rule| rule.applies_to(operation)) {
        let authorization_type = rule_authorization_type(rule);
        if let Some(provider) = rule.provider {
            trace!(
                type_name,
                strategy = ?rule.strategy,
                provider = ?provider,
                "Auth rule provider override"
            );
        }
        if !types.contains(&authorization_type) {
            types.push(authorization_type);
        }
    }
    types
}

#[cfg(test)]
mod tests {
    use super::*;
    use appsync_core::{AuthProvider, ModelField};

    fn schema_with_rules(rules: Vec<AuthRule>) -> ModelSchema {
        rules
            .into_iter()
            .fold(
                ModelSchema::builder("Post").field(ModelField::id("id")),
                |builder, rule| builder.auth_rule(rule),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_owner_then_public() {
        let schema = schema_with_rules(vec![
            AuthRule::owner().with_operations([
                ModelOperation::Create,
                ModelOperation::Update,
                ModelOperation::Delete,
                ModelOperation::Read,
            ]),
            AuthRule::public().with_operations([ModelOperation::Read]),
        ]);
        let strategy = MultiAuthModeStrategy::instance();

        assert_eq!(
            strategy.auth_types_for(&schema, ModelOperation::Read),
            vec![AuthorizationType::AmazonCognitoUserPools, AuthorizationType::ApiKey]
        );
        assert_eq!(
            strategy.auth_types_for(&schema, ModelOperation::Create),
            vec![AuthorizationType::AmazonCognitoUserPools]
        );
        assert_eq!(
            strategy.auth_types_for(&schema, ModelOperation::Delete),
            vec![AuthorizationType::AmazonCognitoUserPools]
        );
    }

    #[test]
    fn test_no_rules_is_empty() {
        let schema = schema_with_rules(Vec::new());
        assert!(
            MultiAuthModeStrategy
                .auth_types_for(&schema, ModelOperation::Read)
                .is_empty()
        );
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let schema = schema_with_rules(vec![
            AuthRule::public(),
            AuthRule::private(),
            AuthRule::groups(["Admin"]),
            AuthRule::public().with_provider(AuthProvider::Iam),
        ]);
        assert_eq!(
            MultiAuthModeStrategy.auth_types_for(&schema, ModelOperation::Update),
            vec![
                AuthorizationType::ApiKey,
                AuthorizationType::AmazonCognitoUserPools,
                AuthorizationType::AwsIam,
            ]
        );
    }

    #[test]
    fn test_provider_override_wins() {
        let schema = schema_with_rules(vec![
            AuthRule::owner().with_provider(AuthProvider::Oidc),
            AuthRule::owner(),
            AuthRule::private().with_provider(AuthProvider::Iam),
        ]);
        assert_eq!(
            MultiAuthModeStrategy.auth_types_for(&schema, ModelOperation::Read),
            vec![
                AuthorizationType::OpenidConnect,
                AuthorizationType::AmazonCognitoUserPools,
                AuthorizationType::AwsIam,
            ]
        );
    }

    #[test]
    fn test_repeatable() {
        let schema = schema_with_rules(vec![AuthRule::groups(["Admin"]), AuthRule::public()]);
        let first = MultiAuthModeStrategy.auth_types_for(&schema, ModelOperation::Read);
        let second = MultiAuthModeStrategy.auth_types_for(&schema, ModelOperation::Read);
        assert_eq!(first, second);
    }

    #[test]
    fn test_field_rules_replace_model_rules() {
        let schema = ModelSchema::builder("Employee")
            .field(ModelField::id("id"))
            .field(
                ModelField::new("salary", "Int")
                    .with_auth_rule(AuthRule::groups(["HR"]).with_provider(AuthProvider::Oidc)),
            )
            .field(ModelField::new("name", "String"))
            .auth_rule(AuthRule::public())
            .build()
            .unwrap();
        let strategy = MultiAuthModeStrategy::instance();

        assert_eq!(
            strategy.auth_types_for_field(&schema, "salary", ModelOperation::Read),
            vec![AuthorizationType::OpenidConnect]
        );
        assert_eq!(
            strategy.auth_types_for_field(&schema, "name", ModelOperation::Read),
            vec![AuthorizationType::ApiKey]
        );
    }

    #[test]
    fn test_default_strategy() {
        let schema = schema_with_rules(vec![AuthRule::public()]);
        let strategy = DefaultAuthModeStrategy::new(AuthorizationType::AwsIam);
        assert_eq!(
            strategy.auth_types_for(&schema, ModelOperation::Read),
            vec![AuthorizationType::AwsIam]
        );
    }

    #[test]
    fn test_strategies_as_trait_objects() {
        let schema = schema_with_rules(vec![AuthRule::private()]);
        let strategies: Vec<Box<dyn AuthModeStrategy>> = vec![
            Box::new(MultiAuthModeStrategy),
            Box::new(DefaultAuthModeStrategy::new(AuthorizationType::ApiKey)),
        ];
        let answers: Vec<_> = strategies
            .iter()
            .map(|s| s.auth_types_for(&schema, ModelOperation::Create))
            .collect();
        assert_eq!(
            answers,
            vec![
                vec![AuthorizationType::AmazonCognitoUserPools],
                vec![AuthorizationType::ApiKey],
            ]
        );
    }
}
