use std::rc::Rc;

use typeclient_ui::{remember, use_state, Component};

use crate::portal::{PortalChannel, PortalPayload};
use crate::slots::{provide_slots, SlotState};

/// Root component of a compose application. Holds the last payload it
/// received as state and registers itself as the portal receiver when it
/// mounts.
pub(crate) fn global_component(
    portal: Rc<PortalChannel<PortalPayload>>,
    slots: SlotState,
) -> Component<()> {
    Component::new("Global", move |_: &()| {
        let content = use_state(PortalPayload::default);
        remember(|| {
            let receiver = content.clone();
            portal.register(move |payload| receiver.set(payload))
        });
        let payload = content.value();
        provide_slots(slots.clone(), || payload.view())
    })
}
