use async_trait::async_trait;
use aws_config::SdkConfig;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterGroupSummary {
    pub name: String,
    pub family: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSummary {
    pub database_name: Option<String>,
    pub identifier: Option<String>,
    pub zones: Vec<String>,
}

#[async_trait]
pub trait DatabaseCatalog {
    async fn describe_parameter_groups(&self) -> Result<Vec<ParameterGroupSummary>>;
    async fn describe_clusters(&self) -> Result<Vec<ClusterSummary>>;
}

pub async fn list_parameter_groups<C: DatabaseCatalog + ?Sized>(
    catalog: &C,
) -> Result<Vec<ParameterGroupSummary>> {
    catalog.describe_parameter_groups().await
}

pub async fn describe_clusters<C: DatabaseCatalog + ?Sized>(
    catalog: &C,
) -> Result<Vec<ClusterSummary>> {
    catalog.describe_clusters().await
}

pub fn format_parameter_group(group: &ParameterGroupSummary) -> String {
    format!(
        "Name:        {}\nFamily:      {}\nDescription: {}\n",
        group.name, group.family, group.description
    )
}

pub fn format_cluster(cluster: &ClusterSummary) -> String {
    format!(
        "Name:  {}\nID:    {}\nZones: {:?}\n",
        cluster.database_name.as_deref().unwrap_or("Unknown"),
        cluster.identifier.as_deref().unwrap_or("Unknown"),
        cluster.zones
    )
}

#[derive(Clone)]
pub struct RdsService {
    pub client: aws_sdk_rds::Client,
}

impl RdsService {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_rds::Client::new(config),
        }
    }
}

#[async_trait]
impl DatabaseCatalog for RdsService {
    async fn describe_parameter_groups(&self) -> Result<Vec<ParameterGroupSummary>> {
        let mut pages = self.client.describe_db_parameter_groups().into_paginator().send();
        let mut groups = Vec::new();
        while let Some(page) = pages.next().await.transpose()? {
            groups.extend(page.db_parameter_groups().iter().map(|g| ParameterGroupSummary {
                name: g.db_parameter_group_name().unwrap_or_default().to_owned(),
                family: g.db_parameter_group_family().unwrap_or_default().to_owned(),
                description: g.description().unwrap_or_default().to_owned(),
            }));
        }
        Ok(groups)
    }

    async fn describe_clusters(&self) -> Result<Vec<ClusterSummary>> {
        let mut pages = self.client.describe_db_clusters().into_paginator().send();
        let mut clusters = Vec::new();
        while let Some(page) = pages.next().await.transpose()? {
            clusters.extend(page.db_clusters().iter().map(|c| ClusterSummary {
                database_name: c.database_name().map(str::to_owned),
                identifier: c.db_cluster_identifier().map(str::to_owned),
                zones: c.availability_zones().to_vec(),
            }));
        }
        Ok(clusters)
    }
}
