//! 点击跳转目标
//!
//! 描述用户点击通知后要打开的页面栈。平台层根据 `TapTarget` 构建真正的
//! 返回栈和待定意图，这里只负责按顺序记录每一跳的页面和参数。

use std::sync::Arc;

use push_shared::events::PushEnvelope;

/// 可跳转的页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// 应用首页（发现页），作为返回栈的根
    Discovery,
    /// 项目详情页
    Project { project_param: String },
    /// 内嵌网页
    WebView { url: String },
}

impl Screen {
    /// 页面声明的父页面，用于补全返回栈
    pub fn parent(&self) -> Option<Screen> {
        match self {
            Self::Project { .. } => Some(Self::Discovery),
            Self::Discovery | Self::WebView { .. } => None,
        }
    }
}

/// 跳转链中的一跳
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavHop {
    pub screen: Screen,
    /// 附带的原始信封，供目标页面上报打开事件
    pub envelope: Option<Arc<PushEnvelope>>,
    /// 由父页面链自动补全，而非调用方显式添加
    pub inferred: bool,
}

impl NavHop {
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            envelope: None,
            inferred: false,
        }
    }

    fn parent_hop(screen: Screen) -> Self {
        Self {
            inferred: true,
            ..Self::new(screen)
        }
    }

    pub fn with_envelope(mut self, envelope: Arc<PushEnvelope>) -> Self {
        self.envelope = Some(envelope);
        self
    }
}

/// 点击跳转目标
///
/// `request_code` 取信封的 signature，配合 `update_current` 使同一通知槽位
/// 的新跳转目标覆盖旧的。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapTarget {
    pub request_code: i32,
    pub update_current: bool,
    pub hops: Vec<NavHop>,
}

impl TapTarget {
    /// 最终打开的页面
    pub fn destination(&self) -> Option<&Screen> {
        self.hops.last().map(|hop| &hop.screen)
    }

    /// 调用方显式添加的跳转链，不含自动补全的父页面
    pub fn screens(&self) -> Vec<&Screen> {
        self.hops
            .iter()
            .filter(|hop| !hop.inferred)
            .map(|hop| &hop.screen)
            .collect()
    }

    /// 完整返回栈，从根页面到目标页面
    pub fn back_stack(&self) -> Vec<&Screen> {
        self.hops.iter().map(|hop| &hop.screen).collect()
    }
}

/// 跳转目标构建器
pub struct TapTargetBuilder {
    request_code: i32,
    hops: Vec<NavHop>,
}

impl TapTargetBuilder {
    pub fn new(request_code: i32) -> Self {
        Self {
            request_code,
            hops: Vec::new(),
        }
    }

    /// 追加一跳，并先补全它尚未在栈中的父页面链
    pub fn add_with_parent_stack(mut self, hop: NavHop) -> Self {
        let mut parents = Vec::new();
        let mut current = hop.screen.parent();
        while let Some(parent) = current {
            current = parent.parent();
            parents.push(parent);
        }
        for parent in parents.into_iter().rev() {
            if !self.hops.iter().any(|h| h.screen == parent) {
                self.hops.push(NavHop::parent_hop(parent));
            }
        }
        self.hops.push(hop);
        self
    }

    /// 原样追加一跳
    pub fn add(mut self, hop: NavHop) -> Self {
        self.hops.push(hop);
        self
    }

    pub fn build(self) -> TapTarget {
        TapTarget {
            request_code: self.request_code,
            update_current: true,
            hops: self.hops,
        }
    }
}
