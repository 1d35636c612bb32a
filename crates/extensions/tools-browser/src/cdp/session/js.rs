//! JavaScript execution operations for CDP page session.

use serde_json::{Value, json};

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{CallArgument, PropertyDescriptor, RemoteObject};

use super::core::PageSession;

/// Turn `exceptionDetails` into an error, preferring the thrown message.
pub(super) fn check_exception(result: &Value) -> Result<(), CdpError> {
    if let Some(exception) = result.get("exceptionDetails") {
        let text = exception["exception"]["description"]
            .as_str()
            .or_else(|| exception["text"].as_str())
            .unwrap_or("Unknown error");
        return Err(CdpError::JavaScript(text.to_string()));
    }
    Ok(())
}

impl PageSession {
    /// Evaluate a JavaScript expression and return its JSON value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Evaluate JavaScript and return a remote object handle.
    pub async fn evaluate_handle(&self, expression: &str) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": false,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(serde_json::from_value(result["result"].clone())?)
    }

    /// Call `function` with `this` bound to `object_id`; returns the JSON value.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<CallArgument>,
    ) -> Result<Value, CdpError> {
        let result = self.call_function_raw(object_id, function, args, true).await?;
        Ok(result["result"]["value"].clone())
    }

    /// Like [`call_function_on`](Self::call_function_on) but returns a handle.
    pub async fn call_function_handle(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<CallArgument>,
    ) -> Result<RemoteObject, CdpError> {
        let result = self.call_function_raw(object_id, function, args, false).await?;
        Ok(serde_json::from_value(result["result"].clone())?)
    }

    async fn call_function_raw(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<CallArgument>,
        by_value: bool,
    ) -> Result<Value, CdpError> {
        let params = json!({
            "objectId": object_id,
            "functionDeclaration": function,
            "arguments": args,
            "returnByValue": by_value,
            "awaitPromise": true,
        });

        let result = self.call("Runtime.callFunctionOn", Some(params)).await?;
        check_exception(&result)?;
        Ok(result)
    }

    /// Own indexed properties of an array-like remote object, as handles.
    pub async fn array_items(&self, object_id: &str) -> Result<Vec<RemoteObject>, CdpError> {
        let result = self
            .call(
                "Runtime.getProperties",
                Some(json!({"objectId": object_id, "ownProperties": true})),
            )
            .await?;

        let props: Vec<PropertyDescriptor> = serde_json::from_value(result["result"].clone())?;
        let mut indexed: Vec<(usize, RemoteObject)> = props
            .into_iter()
            .filter_map(|p| Some((p.name.parse::<usize>().ok()?, p.value?)))
            .collect();
        indexed.sort_by_key(|(i, _)| *i);
        Ok(indexed.into_iter().map(|(_, v)| v).collect())
    }

    /// Let the browser collect a handle. Errors are ignored by callers.
    pub async fn release_object(&self, object_id: &str) -> Result<(), CdpError> {
        self.call("Runtime.releaseObject", Some(json!({"objectId": object_id})))
            .await?;
        Ok(())
    }
}
