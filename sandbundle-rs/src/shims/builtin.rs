//! Built-in adapter sources.
//!
//! Every adapter reads its capability from `globalThis` when the bundle
//! executes, never at build time.

use super::ShimModule;

const REACT_EXPORTS: &[&str] = &[
    "Children",
    "Component",
    "Fragment",
    "Profiler",
    "PureComponent",
    "StrictMode",
    "Suspense",
    "cloneElement",
    "createContext",
    "createElement",
    "createRef",
    "forwardRef",
    "isValidElement",
    "lazy",
    "memo",
    "startTransition",
    "use",
    "useActionState",
    "useCallback",
    "useContext",
    "useDebugValue",
    "useDeferredValue",
    "useEffect",
    "useId",
    "useImperativeHandle",
    "useInsertionEffect",
    "useLayoutEffect",
    "useMemo",
    "useOptimistic",
    "useReducer",
    "useRef",
    "useState",
    "useSyncExternalStore",
    "useTransition",
    "version",
];

const REACT_DOM_EXPORTS: &[&str] = &[
    "createPortal",
    "findDOMNode",
    "flushSync",
    "hydrate",
    "render",
    "unmountComponentAtNode",
];

const REACT_DOM_CLIENT_EXPORTS: &[&str] = &["createRoot", "hydrateRoot"];

const JSX_RUNTIME: &str = r#"const React = globalThis.React;
export const Fragment = React.Fragment;
export function jsx(type, props, key) {
  const config = Object.assign({}, props);
  if (key !== undefined) {
    config.key = key;
  }
  return React.createElement(type, config);
}
export const jsxs = jsx;
export const jsxDEV = jsx;
"#;

const I18NEXT: &str = r#"const i18n = globalThis.i18n;
export default i18n;
export function t() {
  return i18n.t.apply(i18n, arguments);
}
export function changeLanguage(language) {
  return i18n.changeLanguage(language);
}
export function use() {
  return i18n;
}
export function init() {
  return Promise.resolve(t);
}
export function createInstance() {
  return i18n;
}
"#;

const REACT_I18NEXT: &str = r#"const React = globalThis.React;
const i18n = globalThis.i18n;
function translate() {
  return i18n.t.apply(i18n, arguments);
}
export function useTranslation() {
  const result = [translate, i18n, true];
  result.t = translate;
  result.i18n = i18n;
  result.ready = true;
  return result;
}
export function Trans(props) {
  if (props.i18nKey) {
    return i18n.t(props.i18nKey, props.values);
  }
  return props.children === undefined ? null : props.children;
}
export function I18nextProvider(props) {
  return props.children === undefined ? null : props.children;
}
export function withTranslation() {
  return function (Component) {
    return function (props) {
      return React.createElement(
        Component,
        Object.assign({ t: translate, i18n: i18n, tReady: true }, props)
      );
    };
  };
}
export const initReactI18next = { type: "3rdParty", init: function () {} };
"#;

const CLSX: &str = r#"const clsx = globalThis.clsx;
export default clsx;
export { clsx };
"#;

/// Default export is the global itself; each named export re-binds one member.
fn member_adapter(global: &str, exports: &[&str]) -> String {
    let mut source = format!("const {global} = globalThis.{global};\nexport default {global};\n");
    for name in exports {
        source.push_str(&format!("export const {name} = {global}.{name};\n"));
    }
    source
}

/// Default export is an object holding the listed members.
fn member_adapter_with_object_default(global: &str, exports: &[&str]) -> String {
    let mut source = format!("const {global} = globalThis.{global};\n");
    for name in exports {
        source.push_str(&format!("export const {name} = {global}.{name};\n"));
    }
    source.push_str(&format!("export default {{ {} }};\n", exports.join(", ")));
    source
}

pub(super) fn builtin_shims() -> Vec<ShimModule> {
    vec![
        ShimModule::new("react", member_adapter("React", REACT_EXPORTS), &["React"]),
        ShimModule::new("react/jsx-runtime", JSX_RUNTIME, &["React"]),
        ShimModule::new("react/jsx-dev-runtime", JSX_RUNTIME, &["React"]),
        ShimModule::new(
            "react-dom",
            member_adapter("ReactDOM", REACT_DOM_EXPORTS),
            &["ReactDOM"],
        ),
        ShimModule::new(
            "react-dom/client",
            member_adapter_with_object_default("ReactDOM", REACT_DOM_CLIENT_EXPORTS),
            &["ReactDOM"],
        ),
        ShimModule::new("i18next", I18NEXT, &["i18n"]),
        ShimModule::new("react-i18next", REACT_I18NEXT, &["React", "i18n"]),
        ShimModule::new("clsx", CLSX, &["clsx"]),
        ShimModule::new("classnames", CLSX, &["clsx"]),
    ]
}
