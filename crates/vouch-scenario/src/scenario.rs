use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use vouch_context::{publish, ContextStore, InMemoryContextStore, Origin};
use vouch_diff::{
    amend_at_path, check_field, detect_format, diff_at_path, find_matching_document, find_matching_field,
    parse_document, DiffReport, Format, ScanMatch, Side, TolerantKeys,
};
use vouch_template::{Expander, TargetType};
use vouch_types::TypeName;

use crate::cell::infer_row;
use crate::config::ScenarioConfig;
use crate::error::{ScenarioError, ScenarioResult};
use crate::state::{parse_flag, PayloadSlots, RequestState, ResponseState};

/// One scenario's worth of state: its context store, the request and
/// response it is working with, and the payloads it compares.
///
/// Text arguments are expanded against the store before use, the way step
/// arguments are.
pub struct Scenario<S: ContextStore = InMemoryContextStore> {
    store: S,
    config: ScenarioConfig,
    request: RequestState,
    response: ResponseState,
    payloads: PayloadSlots,
    tolerant_keys: Vec<String>,
    last_differences: Option<DiffReport>,
}

impl Scenario<InMemoryContextStore> {
    /// A scenario with an empty in-memory store and default settings.
    pub fn new() -> Self {
        Self::with_config(ScenarioConfig::default())
    }

    pub fn with_config(config: ScenarioConfig) -> Self {
        Self::with_store(InMemoryContextStore::new(), config)
    }
}

impl Default for Scenario<InMemoryContextStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ContextStore> Scenario<S> {
    pub fn with_store(store: S, config: ScenarioConfig) -> Self {
        Self {
            store,
            config,
            request: RequestState::default(),
            response: ResponseState::default(),
            payloads: PayloadSlots::default(),
            tolerant_keys: Vec::new(),
            last_differences: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn request(&self) -> &RequestState {
        &self.request
    }

    pub fn response(&self) -> &ResponseState {
        &self.response
    }

    fn expander(&self) -> Expander<'_, S> {
        Expander::new(&self.store).warn_on_unresolved(self.config.warn_on_unresolved)
    }

    // ---- Context ----

    pub fn set_var(&self, key: &str, value: impl Into<Value>) -> ScenarioResult<()> {
        self.store.set(key, value.into())?;
        Ok(())
    }

    pub fn var(&self, key: &str) -> ScenarioResult<Option<Value>> {
        Ok(self.store.get(key)?)
    }

    /// Resolve nested placeholders in `text`.
    pub fn expand(&self, text: &str) -> ScenarioResult<String> {
        Ok(self.expander().deep(text)?.text)
    }

    /// Substitute flat placeholders, leaving unknown ones as written.
    pub fn expand_shallow(&self, text: &str) -> ScenarioResult<String> {
        Ok(self.expander().shallow(text)?)
    }

    pub fn expand_as(&self, text: &str, target: TargetType) -> ScenarioResult<Value> {
        Ok(self.expander().deep_as(text, target)?)
    }

    /// Expand and type every cell of a `(key, cell)` table.
    pub fn table_row<'a, I>(&self, rows: I) -> ScenarioResult<Map<String, Value>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let cells = rows
            .into_iter()
            .map(|(key, cell)| Ok((key, self.expand(cell.trim())?)))
            .collect::<ScenarioResult<Vec<_>>>()?;
        Ok(infer_row(cells.iter().map(|(key, cell)| (*key, cell.as_str()))))
    }

    /// Write a payload into the context under `origin`.
    ///
    /// JSON and XML payloads are flattened into one key per leaf. Anything
    /// else, or any payload when publishing is disabled, is stored whole
    /// under the bare origin key. Returns the number of keys written.
    pub fn publish_payload(&self, origin: Origin, text: &str) -> ScenarioResult<usize> {
        if self.config.publish_payloads {
            if let Some(format) = detect_format(text) {
                match parse_document(text, format, &self.config.xml) {
                    Ok(tree) => return Ok(publish(&self.store, origin, &tree)?),
                    Err(e) => warn!(%origin, error = %e, "payload stored unflattened"),
                }
            }
        }
        self.store.set(&origin.key(""), Value::String(text.to_string()))?;
        Ok(1)
    }

    fn publish_members(&self, origin: Origin, members: &Map<String, Value>) -> ScenarioResult<()> {
        for (key, value) in members {
            self.store.set(&origin.key(key), value.clone())?;
        }
        debug!(%origin, keys = members.len(), "published members into context");
        Ok(())
    }

    fn expand_number<T: std::str::FromStr>(&self, name: &'static str, text: &str) -> ScenarioResult<T> {
        let expanded = self.expand(text)?;
        expanded
            .trim()
            .parse()
            .map_err(|_| ScenarioError::InvalidArgument { name, value: expanded })
    }

    // ---- Request ----

    pub fn set_request_headers(&mut self, headers: Map<String, Value>) -> ScenarioResult<()> {
        self.publish_members(Origin::RequestHeaders, &headers)?;
        self.request.headers = headers;
        Ok(())
    }

    pub fn set_request_params(&mut self, params: Map<String, Value>) -> ScenarioResult<()> {
        self.publish_members(Origin::RequestParams, &params)?;
        self.request.params = params;
        Ok(())
    }

    pub fn set_request_form(&mut self, form: Map<String, Value>) -> ScenarioResult<()> {
        self.publish_members(Origin::RequestForm, &form)?;
        self.request.form = form;
        Ok(())
    }

    pub fn set_request_method(&mut self, method: &str) -> ScenarioResult<()> {
        let method = self.expand(method)?;
        self.store.set(&Origin::RequestMethod.key(""), Value::String(method.clone()))?;
        self.request.method = Some(method);
        Ok(())
    }

    pub fn set_request_fail_on_status_code(&mut self, flag: &str) -> ScenarioResult<()> {
        let flag = parse_flag(&self.expand(flag)?);
        self.store.set(&Origin::RequestFailOnStatusCode.key(""), Value::Bool(flag))?;
        self.request.fail_on_status_code = Some(flag);
        Ok(())
    }

    pub fn set_request_ignore_https_errors(&mut self, flag: &str) -> ScenarioResult<()> {
        let flag = parse_flag(&self.expand(flag)?);
        self.store.set(&Origin::RequestIgnoreHttpsErrors.key(""), Value::Bool(flag))?;
        self.request.ignore_https_errors = Some(flag);
        Ok(())
    }

    pub fn set_request_max_redirects(&mut self, max: &str) -> ScenarioResult<()> {
        let max: u32 = self.expand_number("max redirects", max)?;
        self.store.set(&Origin::RequestMaxRedirects.key(""), Value::from(max))?;
        self.request.max_redirects = Some(max);
        Ok(())
    }

    pub fn set_request_max_retries(&mut self, max: &str) -> ScenarioResult<()> {
        let max: u32 = self.expand_number("max retries", max)?;
        self.store.set(&Origin::RequestMaxRetries.key(""), Value::from(max))?;
        self.request.max_retries = Some(max);
        Ok(())
    }

    /// Set the request timeout in milliseconds.
    pub fn set_request_timeout(&mut self, timeout: &str) -> ScenarioResult<()> {
        let timeout: u64 = self.expand_number("timeout", timeout)?;
        self.store.set(&Origin::RequestTimeout.key(""), Value::from(timeout))?;
        self.request.timeout = Some(timeout);
        Ok(())
    }

    pub fn set_request_data(&mut self, text: &str) -> ScenarioResult<()> {
        let data = self.expand(text)?;
        self.publish_payload(Origin::RequestData, &data)?;
        self.request.data = Some(data);
        Ok(())
    }

    pub fn set_request_data_file(&mut self, path: &Path) -> ScenarioResult<()> {
        let text = std::fs::read_to_string(path)?;
        self.set_request_data(&text)
    }

    /// Set the request body to a JSON object built from table rows, or an
    /// array when there is more than one row.
    pub fn set_request_data_rows(&mut self, rows: Vec<Map<String, Value>>) -> ScenarioResult<()> {
        let text = rows_to_json(rows);
        self.set_request_data(&text)
    }

    // ---- Response ----

    pub fn set_response_data(&mut self, text: &str) -> ScenarioResult<()> {
        let data = self.expand(text)?;
        self.publish_payload(Origin::ResponseData, &data)?;
        self.response.data = Some(data);
        Ok(())
    }

    pub fn set_response_data_file(&mut self, path: &Path) -> ScenarioResult<()> {
        let text = std::fs::read_to_string(path)?;
        self.set_response_data(&text)
    }

    pub fn set_response_data_rows(&mut self, rows: Vec<Map<String, Value>>) -> ScenarioResult<()> {
        let text = rows_to_json(rows);
        self.set_response_data(&text)
    }

    /// Set the raw response body. The body is stored whole, never flattened.
    pub fn set_response_body(&mut self, text: &str) -> ScenarioResult<()> {
        let body = self.expand(text)?;
        self.store.set(&Origin::ResponseBody.key(""), Value::String(body.clone()))?;
        self.response.body = Some(body);
        Ok(())
    }

    pub fn set_response_content_type(&mut self, content_type: &str) -> ScenarioResult<()> {
        let content_type = self.expand(content_type)?;
        self.store
            .set(&Origin::ResponseContentType.key(""), Value::String(content_type.clone()))?;
        self.response.content_type = Some(content_type);
        Ok(())
    }

    pub fn set_response_headers(&mut self, headers: Map<String, Value>) -> ScenarioResult<()> {
        self.publish_members(Origin::ResponseHeaders, &headers)?;
        self.response.headers = headers;
        Ok(())
    }

    pub fn set_response_path(&mut self, path: &str) -> ScenarioResult<()> {
        let path = self.expand(path)?;
        self.store.set(&Origin::ResponsePath.key(""), Value::String(path.clone()))?;
        self.response.path = Some(path);
        Ok(())
    }

    pub fn set_response_status(&mut self, status: &str) -> ScenarioResult<()> {
        let status: u16 = self.expand_number("response status", status)?;
        self.store.set(&Origin::ResponseStatus.key(""), Value::from(status))?;
        self.response.status = Some(status);
        Ok(())
    }

    // ---- Payloads ----

    fn slot(&self, format: Format, side: Side) -> Option<&String> {
        match (format, side) {
            (Format::Json, Side::Expected) => self.payloads.expected_json.as_ref(),
            (Format::Json, Side::Actual) => self.payloads.actual_json.as_ref(),
            (Format::Xml, Side::Expected) => self.payloads.expected_xml.as_ref(),
            (Format::Xml, Side::Actual) => self.payloads.actual_xml.as_ref(),
        }
    }

    fn required_slot(&self, format: Format, side: Side) -> ScenarioResult<&String> {
        self.slot(format, side)
            .ok_or(ScenarioError::MissingPayload { side, format })
    }

    fn load(&mut self, format: Format, side: Side, text: &str) -> ScenarioResult<()> {
        let text = self.expand(text)?;
        let origin = payload_origin(format, side);
        self.publish_payload(origin, &text)?;
        self.store.set(&origin.key(""), Value::String(text.clone()))?;
        let slot = match (format, side) {
            (Format::Json, Side::Expected) => &mut self.payloads.expected_json,
            (Format::Json, Side::Actual) => &mut self.payloads.actual_json,
            (Format::Xml, Side::Expected) => &mut self.payloads.expected_xml,
            (Format::Xml, Side::Actual) => &mut self.payloads.actual_xml,
        };
        *slot = Some(text);
        debug!(%format, %side, "payload loaded");
        Ok(())
    }

    /// Load the expected payload, expanding placeholders now.
    pub fn load_expected(&mut self, format: Format, text: &str) -> ScenarioResult<()> {
        self.load(format, Side::Expected, text)
    }

    /// Load the actual payload, expanding placeholders now.
    pub fn load_actual(&mut self, format: Format, text: &str) -> ScenarioResult<()> {
        self.load(format, Side::Actual, text)
    }

    pub fn load_expected_file(&mut self, format: Format, path: &Path) -> ScenarioResult<()> {
        let text = std::fs::read_to_string(path)?;
        self.load_expected(format, &text)
    }

    pub fn load_actual_file(&mut self, format: Format, path: &Path) -> ScenarioResult<()> {
        let text = std::fs::read_to_string(path)?;
        self.load_actual(format, &text)
    }

    /// Declare the keys to tolerate. Keys are kept as written and expanded
    /// each time a comparison runs.
    pub fn set_tolerant_keys<I, K>(&mut self, keys: I) -> ScenarioResult<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.tolerant_keys = keys.into_iter().map(Into::into).collect();
        for key in &self.tolerant_keys {
            self.store
                .set(&Origin::TolerantKeys.key(key), Value::String(key.clone()))?;
        }
        Ok(())
    }

    /// The tolerant keys with placeholders resolved against the current context.
    pub fn tolerant_keys(&self) -> ScenarioResult<TolerantKeys> {
        self.tolerant_keys.iter().map(|key| self.expand(key)).collect()
    }

    /// Differences found by the most recent comparison.
    pub fn last_differences(&self) -> Option<&DiffReport> {
        self.last_differences.as_ref()
    }

    /// Compare the loaded expected and actual payloads at `scope`.
    ///
    /// The expected payload and the scope are expanded again so values set
    /// after loading are picked up. Any difference fails with
    /// [`ScenarioError::Mismatch`].
    pub fn compare(&mut self, format: Format, scope: &str) -> ScenarioResult<DiffReport> {
        let scope = self.expand(scope)?;
        let expected = self.expand(self.required_slot(format, Side::Expected)?)?;
        let actual = self.required_slot(format, Side::Actual)?;
        let tolerant = self.tolerant_keys()?;

        let expected = parse_document(&expected, format, &self.config.xml)?;
        let actual = parse_document(actual, format, &self.config.xml)?;
        let report = diff_at_path(&expected, &actual, &scope, &tolerant)?;
        self.last_differences = Some(report.clone());

        if report.is_empty() {
            info!(%format, %scope, "expected payload matched actual payload");
            return Ok(report);
        }
        for difference in &report {
            warn!(%difference, "difference caught");
        }
        Err(ScenarioError::Mismatch(report))
    }

    /// [`compare`](Self::compare) at the configured default scope.
    pub fn compare_all(&mut self, format: Format) -> ScenarioResult<DiffReport> {
        let scope = self.config.default_scope.clone();
        self.compare(format, &scope)
    }

    /// Assert a single field of the actual payload.
    pub fn assert_field(&self, format: Format, scope: &str, value: &str, type_name: &str) -> ScenarioResult<()> {
        let scope = self.expand(scope)?;
        let value = self.expand(value)?;
        let actual = parse_document(self.required_slot(format, Side::Actual)?, format, &self.config.xml)?;
        check_field(&actual, &scope, &value, type_name)?;
        Ok(())
    }

    /// Find the first document in `dir` that matches the expected payload at `scope`.
    pub fn compare_folder(&self, format: Format, dir: &str, scope: &str) -> ScenarioResult<ScanMatch> {
        let dir = PathBuf::from(self.expand(dir)?);
        let scope = self.expand(scope)?;
        let expected = self.expand(self.required_slot(format, Side::Expected)?)?;
        let expected = parse_document(&expected, format, &self.config.xml)?;
        let tolerant = self.tolerant_keys()?;
        let found = find_matching_document(&dir, format, &expected, &scope, &tolerant, &self.config.xml)?;
        info!(file = %found.file.display(), "matching document found");
        Ok(found)
    }

    /// Find the first document in `dir` whose field at `scope` has the given value and type.
    pub fn assert_folder_field(
        &self,
        format: Format,
        dir: &str,
        scope: &str,
        value: &str,
        type_name: &str,
    ) -> ScenarioResult<ScanMatch> {
        let dir = PathBuf::from(self.expand(dir)?);
        let scope = self.expand(scope)?;
        let value = self.expand(value)?;
        let type_name: TypeName = type_name.parse().map_err(vouch_diff::DiffError::from)?;
        let found = find_matching_field(&dir, format, &scope, &value, type_name, &self.config.xml)?;
        info!(file = %found.file.display(), "matching document found");
        Ok(found)
    }

    // ---- Amendments ----

    /// Replace the request body nodes at `expr`, keeping each node's type.
    pub fn amend_request_data(&mut self, expr: &str, value: &str) -> ScenarioResult<usize> {
        let data = self.request.data.clone().ok_or(ScenarioError::MissingData("request data"))?;
        let (amended, count) = self.amend(&data, expr, value)?;
        self.publish_payload(Origin::RequestData, &amended)?;
        self.request.data = Some(amended);
        Ok(count)
    }

    /// Replace the response data nodes at `expr`, keeping each node's type.
    pub fn amend_response_data(&mut self, expr: &str, value: &str) -> ScenarioResult<usize> {
        let data = self.response.data.clone().ok_or(ScenarioError::MissingData("response data"))?;
        let (amended, count) = self.amend(&data, expr, value)?;
        self.publish_payload(Origin::ResponseData, &amended)?;
        self.response.data = Some(amended);
        Ok(count)
    }

    fn amend(&self, data: &str, expr: &str, value: &str) -> ScenarioResult<(String, usize)> {
        let expr = self.expand(expr)?;
        let value = self.expand(value)?;
        let mut tree = parse_document(data, Format::Json, &self.config.xml)?;
        let count = amend_at_path(&mut tree, &expr, &value)?;
        Ok((tree.to_string(), count))
    }
}

fn payload_origin(format: Format, side: Side) -> Origin {
    match (format, side) {
        (Format::Json, Side::Expected) => Origin::ExpectedJson,
        (Format::Json, Side::Actual) => Origin::ActualJson,
        (Format::Xml, Side::Expected) => Origin::ExpectedXml,
        (Format::Xml, Side::Actual) => Origin::ActualXml,
    }
}

fn rows_to_json(mut rows: Vec<Map<String, Value>>) -> String {
    let value = if rows.len() == 1 {
        Value::Object(rows.remove(0))
    } else {
        Value::Array(rows.into_iter().map(Value::Object).collect())
    };
    value.to_string()
}
