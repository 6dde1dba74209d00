pub mod augmentation;
pub mod classification;

use shared::{ClientConfig, Notice};
use std::rc::Rc;
use yew::prelude::*;

/// Props shared by both tool pages.
#[derive(Properties, Clone)]
pub struct PageProps {
    pub config: Rc<ClientConfig>,
    pub on_notify: Callback<Notice>,
}

impl PartialEq for PageProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.config, &other.config) && self.on_notify == other.on_notify
    }
}
