use super::{improve_error_message, Context, ContextError};
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams};
use tracing::info;

impl Context {
    /// Get a resource from the target namespace
    pub async fn get<K>(&self, name: &str) -> Result<K, ContextError>
    where
        K: kube::Resource<Scope = kube::core::NamespaceResourceScope>
            + Clone
            + serde::de::DeserializeOwned
            + std::fmt::Debug,
        <K as kube::Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &self.namespace);
        let kind = K::kind(&Default::default()).to_string();

        api.get(name)
            .await
            .map_err(|e| ContextError::GetError(improve_error_message(&e, &kind, name)))
    }

    /// List cluster-scoped resources of a given type
    ///
    /// Used by the conformance scenarios to enumerate
    /// `CustomResourceDefinition`s through the typed client.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
    ///
    /// let crds: Vec<CustomResourceDefinition> = ctx.list_cluster().await?;
    /// ```
    pub async fn list_cluster<K>(&self) -> Result<Vec<K>, ContextError>
    where
        K: kube::Resource<Scope = kube::core::ClusterResourceScope>
            + Clone
            + serde::de::DeserializeOwned
            + std::fmt::Debug,
        <K as kube::Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::all(self.client.clone());
        let kind = K::kind(&Default::default()).to_string();

        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ContextError::ListError(format!("failed to list {kind}: {e}")))?;

        Ok(list.items)
    }

    /// Delete a resource from the target namespace
    pub async fn delete<K>(&self, name: &str) -> Result<(), ContextError>
    where
        K: kube::Resource<Scope = kube::core::NamespaceResourceScope>
            + Clone
            + serde::de::DeserializeOwned
            + std::fmt::Debug,
        <K as kube::Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &self.namespace);
        let kind = K::kind(&Default::default()).to_string();

        api.delete(name, &DeleteParams::default())
            .await
            .map_err(|e| ContextError::DeleteError(improve_error_message(&e, &kind, name)))?;

        info!(
            namespace = %self.namespace,
            name = %name,
            kind = %kind,
            "Deleted resource"
        );

        Ok(())
    }

    /// Patch a resource in the target namespace using JSON Merge Patch
    ///
    /// Fields set to `null` are deleted, other fields are merged
    /// (RFC 7396).
    pub async fn patch<K>(&self, name: &str, patch: &serde_json::Value) -> Result<K, ContextError>
    where
        K: kube::Resource<Scope = kube::core::NamespaceResourceScope>
            + Clone
            + serde::de::DeserializeOwned
            + std::fmt::Debug,
        <K as kube::Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &self.namespace);
        let kind = K::kind(&Default::default()).to_string();

        let patched = api
            .patch(name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(|e| ContextError::PatchError(improve_error_message(&e, &kind, name)))?;

        info!(
            namespace = %self.namespace,
            name = %name,
            "Patched resource"
        );

        Ok(patched)
    }
}
