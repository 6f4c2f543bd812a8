#[macro_export]
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $entity_name_snake:ident) => {
        paste::paste! {
            #[allow(dead_code)]
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](
                    &self,
                    id: uuid::Uuid,
                ) -> $crate::error::MachineResult<Option<$entity>> {
                    tracing::debug!("Sending request");
                    Ok(self.inner.get(id).await?)
                }

                #[tracing::instrument(skip(self, item), fields(id = %item.id()))]
                pub async fn [<insert_ $entity_name_snake>](
                    &self,
                    item: $entity,
                ) -> $crate::error::MachineResult<()> {
                    tracing::debug!("Sending request");
                    let mut uow = self.inner.begin();
                    uow.insert(item);
                    Ok(uow.commit().await?)
                }

                /// Swaps `current` for `next` in one commit: delete, then insert.
                #[tracing::instrument(skip(self, current, next), fields(id = %current.id()))]
                pub async fn [<replace_ $entity_name_snake>](
                    &self,
                    current: &$entity,
                    next: $entity,
                ) -> $crate::error::MachineResult<()> {
                    tracing::debug!("Sending request");
                    let mut uow = self.inner.begin();
                    uow.delete(current).insert(next);
                    Ok(uow.commit().await?)
                }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_client_new {
    ($client_name:ident, $entity:ty) => {
        impl $client_name {
            pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                Self { inner }
            }
        }
    };
}

#[macro_export]
macro_rules! impl_basic_client {
    ($client_name:ident, $entity:ty, $entity_name_snake:ident) => {
        $crate::impl_client_new!($client_name, $entity);
        $crate::impl_client_methods!($client_name, $entity, $entity_name_snake);
    };
}
