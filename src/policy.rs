use serde::Serialize;

pub const POLICY_VERSION: &str = "2012-10-17";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub sid: String,
    pub effect: Effect,
    pub principal: Principal,
    pub action: OneOrMany,
    pub resource: OneOrMany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Principal {
    /// Serializes as the bare string `"*"` (anyone).
    Anyone(&'static str),
    Aws {
        #[serde(rename = "AWS")]
        aws: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Policy {
    /// Lets anyone read any object in `bucket`.
    pub fn read_only_anonymous(bucket: &str) -> Self {
        Self {
            version: POLICY_VERSION.to_owned(),
            statement: vec![Statement {
                sid: "AddPerm".to_owned(),
                effect: Effect::Allow,
                principal: Principal::Anyone("*"),
                action: OneOrMany::Many(vec!["s3:GetObject".to_owned()]),
                resource: OneOrMany::Many(vec![format!("arn:aws:s3:::{}/*", bucket)]),
            }],
        }
    }

    /// Grants every directory-bucket action to identities in the bucket
    /// owner's account.
    pub fn directory_bucket_admin(region: &str, account_id: &str, bucket: &str) -> Self {
        Self {
            version: POLICY_VERSION.to_owned(),
            statement: vec![Statement {
                sid: "AdminPolicy".to_owned(),
                effect: Effect::Allow,
                principal: Principal::Aws {
                    aws: format!("arn:aws:iam::{}:root", account_id),
                },
                action: OneOrMany::One("s3express:*".to_owned()),
                resource: OneOrMany::One(format!(
                    "arn:aws:s3express:{}:{}:bucket/{}",
                    region, account_id, bucket
                )),
            }],
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
