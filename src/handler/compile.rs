use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{MetadataError, RequestError};
use crate::metadata::{ArgumentBinding, MethodMetadata};
use crate::response::MethodResult;
use crate::transport::{ErrorSink, RequestContext, ResponseHandle};
use crate::validate::{
    BodyValidator, JsonSchemaEngine, ParamSource, ParamValidator, SchemaEngine,
};

/// What one bound argument resolves to at request time.
#[derive(Debug, Clone)]
pub enum ArgValue {
    /// A JSON value: the body, a validated/coerced parameter, or a factory
    /// result.
    Json(Value),
    /// The raw transport request, unvalidated.
    Request(Arc<RequestContext>),
    /// The raw transport response handle, unvalidated.
    Response(ResponseHandle),
    /// A declared position with nothing bound to it, or an absent optional
    /// value.
    Absent,
}

impl ArgValue {
    /// The JSON value, if this argument carries one.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ArgValue::Json(v) => Some(v),
            _ => None,
        }
    }

    /// The raw request, if this argument carries it.
    #[must_use]
    pub fn as_request(&self) -> Option<&Arc<RequestContext>> {
        match self {
            ArgValue::Request(req) => Some(req),
            _ => None,
        }
    }

    /// The response handle, if this argument carries it.
    #[must_use]
    pub fn as_response(&self) -> Option<&ResponseHandle> {
        match self {
            ArgValue::Response(res) => Some(res),
            _ => None,
        }
    }

    /// Whether this argument resolved to nothing.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, ArgValue::Absent)
    }
}

type InvokeFn = dyn Fn(&[ArgValue]) -> anyhow::Result<MethodResult> + Send + Sync;

/// Compiles finalized [`MethodMetadata`] plus a controller method into a
/// [`CompiledHandler`], mapping every declared constraint through the schema
/// engine exactly once.
pub struct HandlerCompiler {
    engine: Arc<dyn SchemaEngine>,
}

impl Default for HandlerCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerCompiler {
    /// A compiler backed by the default [`JsonSchemaEngine`].
    #[must_use]
    pub fn new() -> Self {
        HandlerCompiler {
            engine: Arc::new(JsonSchemaEngine),
        }
    }

    /// A compiler backed by a custom schema engine.
    #[must_use]
    pub fn with_engine(engine: Arc<dyn SchemaEngine>) -> Self {
        HandlerCompiler { engine }
    }

    /// Compile one method's handler.
    ///
    /// Pure given immutable inputs: compiling the same finalized metadata
    /// twice yields handlers with identical observable behavior. The
    /// returned handler may be registered with the transport any number of
    /// times and invoked concurrently.
    ///
    /// # Errors
    ///
    /// [`MetadataError::SchemaCompile`] when a declared schema is rejected
    /// by the engine.
    pub fn compile<C, F>(
        &self,
        controller: Arc<C>,
        method: F,
        metadata: MethodMetadata,
    ) -> Result<CompiledHandler, MetadataError>
    where
        C: Send + Sync + 'static,
        F: Fn(&C, &[ArgValue]) -> anyhow::Result<MethodResult> + Send + Sync + 'static,
    {
        let mut path_validators = HashMap::new();
        for (name, constraint) in &metadata.path_params {
            let validator =
                ParamValidator::compile(self.engine.as_ref(), name, ParamSource::Path, constraint)?;
            path_validators.insert(name.clone(), validator);
        }

        let mut query_validators = HashMap::new();
        for (name, constraint) in &metadata.query_params {
            let validator = ParamValidator::compile(
                self.engine.as_ref(),
                name,
                ParamSource::Query,
                constraint,
            )?;
            query_validators.insert(name.clone(), validator);
        }

        let body_validator = if metadata.body.required.is_some() || metadata.body.schema.is_some()
        {
            Some(BodyValidator::compile(self.engine.as_ref(), &metadata.body)?)
        } else {
            None
        };

        info!(
            args = metadata.args.len(),
            path_validators = path_validators.len(),
            query_validators = query_validators.len(),
            body_validator = body_validator.is_some(),
            "handler compiled"
        );

        Ok(CompiledHandler {
            metadata: Arc::new(metadata),
            path_validators: Arc::new(path_validators),
            query_validators: Arc::new(query_validators),
            body_validator,
            invoke_fn: Arc::new(move |args| method(&controller, args)),
        })
    }
}

/// The compiled artifact: finalized metadata, compiled validators, and the
/// target method, closed over together.
///
/// Immutable after compilation; every invocation is an independent run over
/// shared read-only state, so clones are cheap and concurrent use needs no
/// locking.
#[derive(Clone)]
pub struct CompiledHandler {
    metadata: Arc<MethodMetadata>,
    path_validators: Arc<HashMap<String, ParamValidator>>,
    query_validators: Arc<HashMap<String, ParamValidator>>,
    body_validator: Option<BodyValidator>,
    invoke_fn: Arc<InvokeFn>,
}

impl std::fmt::Debug for CompiledHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledHandler")
            .field("args", &self.metadata.args)
            .field("path_validators", &self.path_validators.len())
            .field("query_validators", &self.query_validators.len())
            .field("body_validator", &self.body_validator.is_some())
            .finish_non_exhaustive()
    }
}

impl CompiledHandler {
    /// The finalized metadata this handler was compiled from.
    #[must_use]
    pub fn metadata(&self) -> &MethodMetadata {
        &self.metadata
    }

    /// Extract one argument per binding, in declared-index order.
    fn collect_args(
        &self,
        req: &Arc<RequestContext>,
        res: &ResponseHandle,
    ) -> Result<Vec<ArgValue>, RequestError> {
        let mut args = Vec::with_capacity(self.metadata.args.len());
        for binding in &self.metadata.args {
            let arg = match binding {
                ArgumentBinding::Body => {
                    let body = match &self.body_validator {
                        Some(validator) => validator.validate(req.body.as_ref())?,
                        None => req.body.clone(),
                    };
                    body.map_or(ArgValue::Absent, ArgValue::Json)
                }
                ArgumentBinding::PathParam(name) => {
                    let raw = req.get_path_param(name);
                    match self.path_validators.get(name) {
                        Some(validator) => {
                            validator.validate(raw)?.map_or(ArgValue::Absent, ArgValue::Json)
                        }
                        None => raw
                            .map_or(ArgValue::Absent, |v| ArgValue::Json(Value::String(v.into()))),
                    }
                }
                ArgumentBinding::QueryParam(name) => {
                    let raw = req.get_query_param(name);
                    match self.query_validators.get(name) {
                        Some(validator) => {
                            validator.validate(raw)?.map_or(ArgValue::Absent, ArgValue::Json)
                        }
                        None => raw
                            .map_or(ArgValue::Absent, |v| ArgValue::Json(Value::String(v.into()))),
                    }
                }
                ArgumentBinding::Request => ArgValue::Request(Arc::clone(req)),
                ArgumentBinding::Response => ArgValue::Response(res.clone()),
                ArgumentBinding::ValueFactory { factory, options } => {
                    ArgValue::Json(factory(req, options.as_ref())?)
                }
                ArgumentBinding::Unbound => ArgValue::Absent,
            };
            args.push(arg);
        }
        Ok(args)
    }

    /// Run one request: extract and validate the arguments, invoke the
    /// method, return its result.
    ///
    /// # Errors
    ///
    /// Extraction and validation failures per their classification in
    /// [`RequestError`]; a method error comes back as
    /// [`RequestError::Invocation`], unmodified.
    pub fn invoke(
        &self,
        req: &Arc<RequestContext>,
        res: &ResponseHandle,
    ) -> Result<MethodResult, RequestError> {
        let args = self.collect_args(req, res)?;
        debug!(
            request_id = %req.request_id,
            arg_count = args.len(),
            "arguments assembled"
        );
        let result = (self.invoke_fn)(&args)?;
        Ok(result)
    }

    /// Run one request and finish it: apply the method result to the
    /// response handle, or forward the failure to the error sink.
    ///
    /// Errors never cross into the transport's normal dispatch path. When
    /// the method wrote the response itself (raw `Response` binding), the
    /// returned result is discarded.
    pub fn handle(&self, req: &Arc<RequestContext>, res: &ResponseHandle, errors: &dyn ErrorSink) {
        match self.invoke(req, res) {
            Ok(result) => {
                if res.is_completed() {
                    debug!(request_id = %req.request_id, "response already completed by method");
                } else {
                    res.complete(result);
                }
            }
            Err(err) => {
                warn!(
                    request_id = %req.request_id,
                    status = err.status_code(),
                    error = %err,
                    "request failed"
                );
                errors.forward(err);
            }
        }
    }
}
