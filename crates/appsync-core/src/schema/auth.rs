//! Declarative authorization metadata attached to models and fields.
//!
//! These types describe *which* strategy governs *which* CRUD operations.
//! Turning them into concrete wire behavior (auth modes, owner arguments)
//! is done by the request layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default owner field name for owner-based rules.
pub const DEFAULT_OWNER_FIELD: &str = "owner";

/// Default identity claim for owner-based rules.
pub const DEFAULT_IDENTITY_CLAIM: &str = "username";

/// Default group claim for group-based rules.
pub const DEFAULT_GROUP_CLAIM: &str = "cognito:groups";

/// CRUD operation an authorization rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelOperation {
    Create,
    Read,
    Update,
    Delete,
}

impl ModelOperation {
    /// All operations, in declaration order.
    pub const ALL: [ModelOperation; 4] = [
        ModelOperation::Create,
        ModelOperation::Read,
        ModelOperation::Update,
        ModelOperation::Delete,
    ];
}

impl fmt::Display for ModelOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Read => write!(f, "read"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Authorization strategy declared by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategy {
    Owner,
    Groups,
    Private,
    Public,
}

/// Identity provider override declared on a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthProvider {
    UserPools,
    Oidc,
    Iam,
    ApiKey,
    Function,
}

impl AuthProvider {
    /// The wire authorization type that signs requests for this provider.
    pub fn authorization_type(self) -> AuthorizationType {
        match self {
            Self::UserPools => AuthorizationType::AmazonCognitoUserPools,
            Self::Oidc => AuthorizationType::OpenidConnect,
            Self::Iam => AuthorizationType::AwsIam,
            Self::ApiKey => AuthorizationType::ApiKey,
            Self::Function => AuthorizationType::AwsLambda,
        }
    }
}

/// Signing/authentication mode usable on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationType {
    AmazonCognitoUserPools,
    OpenidConnect,
    AwsIam,
    ApiKey,
    AwsLambda,
    None,
}

impl AuthorizationType {
    /// Returns the canonical wire name (e.g. `AMAZON_COGNITO_USER_POOLS`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AmazonCognitoUserPools => "AMAZON_COGNITO_USER_POOLS",
            Self::OpenidConnect => "OPENID_CONNECT",
            Self::AwsIam => "AWS_IAM",
            Self::ApiKey => "API_KEY",
            Self::AwsLambda => "AWS_LAMBDA",
            Self::None => "NONE",
        }
    }
}

impl fmt::Display for AuthorizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative statement that a strategy governs a subset of CRUD operations.
///
/// An absent operation list means "all operations".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRule {
    pub strategy: AuthStrategy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<AuthProvider>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_claim: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_claim: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<ModelOperation>>,
}

impl AuthRule {
    /// Create a rule for the given strategy covering all operations.
    pub fn new(strategy: AuthStrategy) -> Self {
        Self {
            strategy,
            provider: None,
            owner_field: None,
            identity_claim: None,
            group_claim: None,
            groups: Vec::new(),
            groups_field: None,
            operations: None,
        }
    }

    pub fn owner() -> Self {
        Self::new(AuthStrategy::Owner)
    }

    pub fn groups(groups: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut rule = Self::new(AuthStrategy::Groups);
        rule.groups = groups.into_iter().map(Into::into).collect();
        rule
    }

    pub fn private() -> Self {
        Self::new(AuthStrategy::Private)
    }

    pub fn public() -> Self {
        Self::new(AuthStrategy::Public)
    }

    /// Set the provider override
    pub fn with_provider(mut self, provider: AuthProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the owner field name
    pub fn with_owner_field(mut self, owner_field: impl Into<String>) -> Self {
        self.owner_field = Some(owner_field.into());
        self
    }

    /// Set the identity claim
    pub fn with_identity_claim(mut self, identity_claim: impl Into<String>) -> Self {
        self.identity_claim = Some(identity_claim.into());
        self
    }

    /// Set the group claim
    pub fn with_group_claim(mut self, group_claim: impl Into<String>) -> Self {
        self.group_claim = Some(group_claim.into());
        self
    }

    /// Set the dynamic groups field
    pub fn with_groups_field(mut self, groups_field: impl Into<String>) -> Self {
        self.groups_field = Some(groups_field.into());
        self
    }

    /// Restrict the rule to the given operations
    pub fn with_operations(mut self, operations: impl IntoIterator<Item = ModelOperation>) -> Self {
        self.operations = Some(operations.into_iter().collect());
        self
    }

    pub fn owner_field_or_default(&self) -> &str {
        self.owner_field.as_deref().unwrap_or(DEFAULT_OWNER_FIELD)
    }

    pub fn identity_claim_or_default(&self) -> &str {
        self.identity_claim.as_deref().unwrap_or(DEFAULT_IDENTITY_CLAIM)
    }

    pub fn group_claim_or_default(&self) -> &str {
        self.group_claim.as_deref().unwrap_or(DEFAULT_GROUP_CLAIM)
    }

    /// Operations covered by this rule; all four when none were declared.
    pub fn operations_or_default(&self) -> Vec<ModelOperation> {
        match &self.operations {
            Some(ops) => ops.clone(),
            None => ModelOperation::ALL.to_vec(),
        }
    }

    /// Whether the rule governs `operation`.
    pub fn applies_to(&self, operation: ModelOperation) -> bool {
        match &self.operations {
            Some(ops) => ops.contains(&operation),
            None => true,
        }
    }

    pub fn is_owner_rule(&self) -> bool {
        self.strategy == AuthStrategy::Owner
    }
}
